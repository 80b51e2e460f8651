mod common;

use axum::http::StatusCode;
use serde_json::json;

#[tokio::test]
async fn test_generate_division_problem_is_exact() {
    let app = common::create_test_app();

    for _ in 0..20 {
        let (status, body) = common::post(
            &app,
            "/api/v1/problems",
            json!({ "levelId": "4-2", "difficulty": "hard" }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let problem = &body["problem"];
        let a = problem["operandA"].as_i64().unwrap();
        let b = problem["operandB"].as_i64().unwrap();
        let answer = problem["answer"].as_i64().unwrap();

        assert_eq!(problem["operation"], "division");
        assert_eq!(problem["difficulty"], "hard");
        assert!(b >= 1);
        assert_eq!(a, answer * b);
        assert_eq!(problem["question"], format!("{} ÷ {}", a, b));

        let choices: Vec<i64> = problem["choices"]
            .as_array()
            .unwrap()
            .iter()
            .map(|c| c.as_i64().unwrap())
            .collect();
        assert_eq!(choices.len(), 4);
        assert!(choices.contains(&answer));
        assert!(choices.iter().all(|c| *c >= 0));
    }
}

#[tokio::test]
async fn test_generate_subtraction_never_negative() {
    let app = common::create_test_app();

    for _ in 0..20 {
        let (status, body) = common::post(
            &app,
            "/api/v1/problems",
            json!({ "levelId": "2-1", "difficulty": "medium" }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert!(body["problem"]["answer"].as_i64().unwrap() >= 0);
    }
}

#[tokio::test]
async fn test_difficulty_defaults_to_easy() {
    let app = common::create_test_app();
    let (status, body) = common::post(&app, "/api/v1/problems", json!({ "levelId": "1-1" })).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["levelId"], "1-1");
    assert_eq!(body["problem"]["difficulty"], "easy");
}

#[tokio::test]
async fn test_generate_for_unknown_level() {
    let app = common::create_test_app();
    let (status, _) = common::post(&app, "/api/v1/problems", json!({ "levelId": "5-1" })).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_generate_rejects_bad_difficulty() {
    let app = common::create_test_app();
    let (status, _) = common::post(
        &app,
        "/api/v1/problems",
        json!({ "levelId": "1-1", "difficulty": "extreme" }),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}
