use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use quiz_core::model::QuizType;
use services::{HttpSource, QuestionSource, SourceError};

#[tokio::test]
async fn fetches_catalog_and_questions_under_base_path() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/quiz/areas.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "area": "Logic", "file": "logic.json", "type": "True False", "shortName": "log" },
            { "area": "Biology", "file": "data/bio.json", "type": "Multiple Choice" }
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/quiz/data/bio.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "section": "Cells",
                "number": 1,
                "question": "Smallest unit of life?",
                "answer": "cell",
                "options": ["atom", "cell", "gene"],
                "appearsIn": ["2021"]
            }
        ])))
        .mount(&server)
        .await;

    let source = HttpSource::new(&format!("{}/quiz", server.uri()), "areas.json").unwrap();

    let areas = source.fetch_catalog().await.unwrap();
    assert_eq!(areas.len(), 2);
    assert_eq!(areas[0].short_name.as_deref(), Some("log"));
    assert_eq!(areas[1].quiz_type, QuizType::MultipleChoice);

    let questions = source.fetch_questions("data/bio.json").await.unwrap();
    assert_eq!(questions.len(), 1);
    assert_eq!(questions[0].answer, "cell");
    assert_eq!(questions[0].appears_in.as_deref(), Some(&["2021".to_string()][..]));
}

#[tokio::test]
async fn missing_file_is_a_status_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/gone.json"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let source = HttpSource::new(&server.uri(), "areas.json").unwrap();
    let err = source.fetch_questions("gone.json").await.unwrap_err();
    assert!(matches!(
        err,
        SourceError::HttpStatus { status, .. } if status.as_u16() == 404
    ));
}

#[tokio::test]
async fn malformed_body_is_a_parse_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/areas.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let source = HttpSource::new(&server.uri(), "areas.json").unwrap();
    let err = source.fetch_catalog().await.unwrap_err();
    assert!(matches!(err, SourceError::Parse { .. }));
}
