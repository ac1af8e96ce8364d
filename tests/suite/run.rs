//! End-to-end runs against a mocked Gemini backend.

use crate::common::{client_for, mount_answer, mount_error, mount_list, start_gemini_mock};
use xyprompt_engine::present::{HtmlPresenter, TextPresenter};
use xyprompt_engine::{
    BackendError, ListMode, ListSide, ModelName, PlaceholderStyle, QueryTemplate, RunError,
    RunSettings, execute,
};

fn settings(mode: ListMode, x: &str, y: &str, template: &str) -> RunSettings {
    RunSettings {
        mode,
        x_input: x.to_string(),
        y_input: y.to_string(),
        template: QueryTemplate::new(template, PlaceholderStyle::Literal),
        model: ModelName::default(),
        grounding: true,
    }
}

#[tokio::test]
async fn manual_lists_query_every_pair_in_order() {
    let server = start_gemini_mock().await;
    mount_answer(&server, "In Retail, about Cost", "Retail saves money.").await;
    mount_answer(&server, "In Retail, about Speed", "Retail moves fast.").await;
    mount_answer(&server, "In Finance, about Cost", "Finance saves money.").await;
    mount_answer(&server, "In Finance, about Speed", "").await;

    let client = client_for(&server);
    let settings = settings(
        ListMode::Manual,
        " Retail \n\nFinance",
        "Cost\nSpeed\n",
        "In X, about Y",
    );
    let mut presenter = TextPresenter::new(Vec::new(), Vec::new());

    let summary = execute(&settings, &client, &mut presenter).await.unwrap();

    let pairs: Vec<(&str, &str)> = summary
        .results
        .iter()
        .map(|r| (r.x.as_str(), r.y.as_str()))
        .collect();
    assert_eq!(
        pairs,
        [
            ("Retail", "Cost"),
            ("Retail", "Speed"),
            ("Finance", "Cost"),
            ("Finance", "Speed")
        ]
    );
    assert_eq!(summary.results[0].answer, "Retail saves money.");
    assert_eq!(summary.results[3].answer, "");
    assert_eq!(summary.progress.to_string(), "4/4");

    let (out, status) = presenter.into_inner();
    let out = String::from_utf8(out).unwrap();
    let retail = out.find("### X = Retail").unwrap();
    let finance = out.find("### X = Finance").unwrap();
    assert!(retail < out.find("Retail moves fast.").unwrap());
    assert!(out.find("Retail moves fast.").unwrap() < finance);
    assert!(out.contains("(empty response)"));
    assert!(out.contains("[copy_1_1]"));

    let status = String::from_utf8(status).unwrap();
    assert!(status.contains("Running X: 2 items / Y: 2 items (4 queries)"));
    assert!(status.contains("[4/4] 100%"));
    assert!(status.contains("All 4 combinations generated."));
}

#[tokio::test]
async fn generated_lists_fall_back_from_json_to_lines() {
    let server = start_gemini_mock().await;
    mount_list(&server, "Name industries", r#"["Retail", "  "]"#).await;
    mount_list(&server, "Name criteria", "Here you go:\n- Cost\n• Speed").await;
    mount_answer(&server, "Retail/Here you go:", "a0").await;
    mount_answer(&server, "Retail/Cost", "a1").await;
    mount_answer(&server, "Retail/Speed", "a2").await;

    let client = client_for(&server);
    let settings = settings(
        ListMode::Generated,
        "Name industries",
        "Name criteria",
        "X/Y",
    );
    let mut presenter = TextPresenter::new(Vec::new(), Vec::new());

    let summary = execute(&settings, &client, &mut presenter).await.unwrap();

    assert_eq!(summary.x_list.to_vec(), vec!["Retail"]);
    assert_eq!(summary.y_list.to_vec(), vec!["Here you go:", "Cost", "Speed"]);
    let answers: Vec<&str> = summary.results.iter().map(|r| r.answer.as_str()).collect();
    assert_eq!(answers, ["a0", "a1", "a2"]);
}

#[tokio::test]
async fn empty_generated_list_aborts_before_any_question() {
    let server = start_gemini_mock().await;
    mount_list(&server, "Name industries", "[]").await;
    mount_list(&server, "Name criteria", r#"["Cost"]"#).await;

    let client = client_for(&server);
    let settings = settings(
        ListMode::Generated,
        "Name industries",
        "Name criteria",
        "X/Y",
    );
    let mut presenter = TextPresenter::new(Vec::new(), Vec::new());

    let err = execute(&settings, &client, &mut presenter).await.unwrap_err();

    assert!(matches!(err, RunError::EmptyList(ListSide::X)));
    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 2);
    let (out, status) = presenter.into_inner();
    assert!(out.is_empty());
    assert!(String::from_utf8(status).unwrap().contains("X_list is empty"));
}

#[tokio::test]
async fn backend_error_stops_the_run_and_keeps_earlier_output() {
    let server = start_gemini_mock().await;
    mount_answer(&server, "a-1", "first answer").await;
    mount_error(&server, "a-2", 503, "The model is overloaded.").await;

    let client = client_for(&server);
    let settings = settings(ListMode::Manual, "a\nb", "1\n2", "X-Y");
    let mut presenter = TextPresenter::new(Vec::new(), Vec::new());

    let err = execute(&settings, &client, &mut presenter).await.unwrap_err();

    match err {
        RunError::Backend(BackendError::Http { status, message }) => {
            assert_eq!(status.as_u16(), 503);
            assert_eq!(message, "The model is overloaded.");
        }
        other => panic!("expected HTTP backend error, got {other:?}"),
    }

    // b-1 and b-2 were never sent.
    assert_eq!(server.received_requests().await.unwrap().len(), 2);

    let (out, status) = presenter.into_inner();
    let out = String::from_utf8(out).unwrap();
    assert!(out.contains("first answer"));
    assert!(!out.contains("### X = b"));
    let status = String::from_utf8(status).unwrap();
    assert!(status.contains("The model is overloaded."));
    assert!(!status.contains("combinations generated"));
}

#[tokio::test]
async fn html_report_copies_exact_answer() {
    let server = start_gemini_mock().await;
    let answer = "Use <b>bold</b> & \"quotes\"\nsecond line";
    mount_answer(&server, "Retail & Cost", answer).await;

    let client = client_for(&server);
    let mut settings = settings(ListMode::Manual, "Retail", "Cost", "{X} & {Y}");
    settings.template = QueryTemplate::new("{X} & {Y}", PlaceholderStyle::Braced);
    let mut presenter = HtmlPresenter::new(Vec::new(), Vec::new());

    let summary = execute(&settings, &client, &mut presenter).await.unwrap();
    assert_eq!(summary.results[0].answer, answer);

    let (out, _) = presenter.into_inner();
    let html = String::from_utf8(out).unwrap();
    assert!(html.contains("Use &lt;b&gt;bold&lt;/b&gt; &amp; &quot;quotes&quot;"));
    assert!(html.contains(r#"id="copy_0_0_btn""#));

    let payload_line = html
        .lines()
        .find(|line| line.trim_start().starts_with("const payload = "))
        .unwrap();
    let literal = payload_line
        .trim()
        .trim_start_matches("const payload = ")
        .trim_end_matches(';');
    let decoded: String = serde_json::from_str(literal).unwrap();
    assert_eq!(decoded, answer);
}
