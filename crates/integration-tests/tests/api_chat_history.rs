mod support;

use axum::http::{Method, StatusCode};
use serde_json::json;
use serial_test::serial;
use shared::models::{ChatHistoryResponse, ChatResponse, ChatRole};
use uuid::Uuid;

use support::api_app::build_test_router;
use support::ollama_mock::OllamaMock;
use support::{error_code, register_user, request, send_json};

#[tokio::test]
#[serial]
async fn chat_turns_are_answered_and_recorded_in_history() {
    let store = support::test_store().await;
    support::reset_database(store.pool()).await;
    let ollama = OllamaMock::start(&[
        "Упрощёнка подойдёт.",
        "1. Какие ставки?\n- Когда платить?\n\nНужна ли касса?",
        "Ставка 6% от доходов.",
        "Что такое КУДиР?",
    ])
    .await;
    let app = build_test_router(store, &ollama.base_url);
    let token = register_user(&app, "chat@shop.ru").await;

    let first = send_json(
        &app,
        request(
            Method::POST,
            "/chat",
            Some(&token),
            Some(json!({
                "message": "Какой налоговый режим выбрать?",
                "category": "finance",
                "context": {"employees": 2}
            })),
        ),
    )
    .await;
    assert_eq!(first.status, StatusCode::OK, "{}", first.body);
    let first: ChatResponse =
        serde_json::from_value(first.body).expect("chat response should decode");
    assert_eq!(first.response, "Упрощёнка подойдёт.");
    assert_eq!(first.category, "finance");
    assert_eq!(
        first.suggestions.as_deref(),
        Some(
            &[
                "Какие ставки?".to_string(),
                "Когда платить?".to_string(),
                "Нужна ли касса?".to_string()
            ][..]
        )
    );
    let chat_id = first.chat_id.expect("chat id should be returned");

    let second = send_json(
        &app,
        request(
            Method::POST,
            "/chat",
            Some(&token),
            Some(json!({"message": "А ставка?", "category": "finance"})),
        ),
    )
    .await;
    assert_eq!(second.status, StatusCode::OK);
    assert_eq!(second.body["chatId"], chat_id.to_string());

    let seen = ollama.seen_requests.lock().await.clone();
    assert_eq!(seen.len(), 4);
    assert_eq!(seen[0]["model"], "primary-model");
    let composite = seen[0]["messages"][1]["content"]
        .as_str()
        .expect("user content should be a string");
    assert!(composite.starts_with("Контекст: "), "{composite}");
    assert!(composite.contains("\"employees\": 2"), "{composite}");
    assert!(composite.contains("\"userId\""), "{composite}");
    assert!(composite.ends_with("Вопрос: Какой налоговый режим выбрать?"));

    let list = send_json(&app, request(Method::GET, "/history", Some(&token), None)).await;
    assert_eq!(list.status, StatusCode::OK);
    let sessions: Vec<ChatHistoryResponse> =
        serde_json::from_value(list.body).expect("history list should decode");
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0].id, chat_id);
    assert_eq!(sessions[0].title, "Какой налоговый режим выбрать?");

    let roles = sessions[0]
        .messages
        .iter()
        .map(|message| message.role)
        .collect::<Vec<_>>();
    assert_eq!(
        roles,
        vec![
            ChatRole::User,
            ChatRole::Assistant,
            ChatRole::User,
            ChatRole::Assistant
        ]
    );
    assert!(sessions[0].messages[0].suggestions.is_none());
    assert_eq!(
        sessions[0].messages[3].suggestions.as_deref(),
        Some(&["Что такое КУДиР?".to_string()][..])
    );

    ollama.stop().await;
}

#[tokio::test]
#[serial]
async fn history_is_scoped_to_owner_and_delete_is_idempotent() {
    let store = support::test_store().await;
    support::reset_database(store.pool()).await;
    let ollama = OllamaMock::start(&["Договор готов.", ""]).await;
    let app = build_test_router(store, &ollama.base_url);
    let owner = register_user(&app, "owner@shop.ru").await;
    let stranger = register_user(&app, "stranger@shop.ru").await;

    let created = send_json(
        &app,
        request(
            Method::POST,
            "/history/new",
            Some(&owner),
            Some(json!({"category": "documents"})),
        ),
    )
    .await;
    assert_eq!(created.status, StatusCode::OK);
    let created: ChatHistoryResponse =
        serde_json::from_value(created.body).expect("new chat should decode");
    assert_eq!(created.category, "documents");
    assert_eq!(created.title, "New chat");
    assert!(created.messages.is_empty());

    let default_category = send_json(
        &app,
        request(Method::POST, "/history/new", Some(&owner), None),
    )
    .await;
    assert_eq!(default_category.status, StatusCode::OK);
    assert_eq!(default_category.body["category"], "general");

    let targeted = send_json(
        &app,
        request(
            Method::POST,
            "/chat",
            Some(&owner),
            Some(json!({
                "message": "Составь договор поставки",
                "category": "documents",
                "chatId": created.id
            })),
        ),
    )
    .await;
    assert_eq!(targeted.status, StatusCode::OK, "{}", targeted.body);
    assert_eq!(targeted.body["chatId"], created.id.to_string());

    let foreign_read = send_json(
        &app,
        request(
            Method::GET,
            &format!("/history/{}", created.id),
            Some(&stranger),
            None,
        ),
    )
    .await;
    assert_eq!(foreign_read.status, StatusCode::NOT_FOUND);
    assert_eq!(error_code(&foreign_read.body), Some("not_found"));

    let foreign_delete = send_json(
        &app,
        request(
            Method::DELETE,
            &format!("/history/{}", created.id),
            Some(&stranger),
            None,
        ),
    )
    .await;
    assert_eq!(foreign_delete.status, StatusCode::NO_CONTENT);

    let owned = send_json(
        &app,
        request(
            Method::GET,
            &format!("/history/{}", created.id),
            Some(&owner),
            None,
        ),
    )
    .await;
    assert_eq!(owned.status, StatusCode::OK);
    assert_eq!(owned.body["title"], "Составь договор поставки");
    assert_eq!(owned.body["messages"].as_array().map(Vec::len), Some(2));

    for _ in 0..2 {
        let deleted = send_json(
            &app,
            request(
                Method::DELETE,
                &format!("/history/{}", created.id),
                Some(&owner),
                None,
            ),
        )
        .await;
        assert_eq!(deleted.status, StatusCode::NO_CONTENT);
    }

    let gone = send_json(
        &app,
        request(
            Method::GET,
            &format!("/history/{}", created.id),
            Some(&owner),
            None,
        ),
    )
    .await;
    assert_eq!(gone.status, StatusCode::NOT_FOUND);

    let remaining = send_json(&app, request(Method::GET, "/history", Some(&owner), None)).await;
    assert_eq!(remaining.body.as_array().map(Vec::len), Some(1));

    ollama.stop().await;
}

#[tokio::test]
#[serial]
async fn invalid_chat_requests_are_rejected_before_the_model() {
    let store = support::test_store().await;
    support::reset_database(store.pool()).await;
    let ollama = OllamaMock::start(&[]).await;
    let app = build_test_router(store, &ollama.base_url);
    let token = register_user(&app, "limits@shop.ru").await;

    for message in [String::new(), "   ".to_string(), "я".repeat(2001)] {
        let response = send_json(
            &app,
            request(
                Method::POST,
                "/chat",
                Some(&token),
                Some(json!({"message": message})),
            ),
        )
        .await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert_eq!(error_code(&response.body), Some("invalid_message"));
    }

    let unknown_chat = send_json(
        &app,
        request(
            Method::POST,
            "/chat",
            Some(&token),
            Some(json!({"message": "Привет", "chatId": Uuid::new_v4()})),
        ),
    )
    .await;
    assert_eq!(unknown_chat.status, StatusCode::NOT_FOUND);

    assert!(ollama.seen_requests.lock().await.is_empty());
    ollama.stop().await;
}

#[tokio::test]
#[serial]
async fn unreachable_provider_maps_to_service_unavailable() {
    let store = support::test_store().await;
    support::reset_database(store.pool()).await;
    let app = build_test_router(store, "http://127.0.0.1:9");
    let token = register_user(&app, "offline@shop.ru").await;

    let chat = send_json(
        &app,
        request(
            Method::POST,
            "/chat",
            Some(&token),
            Some(json!({"message": "Есть кто?"})),
        ),
    )
    .await;
    assert_eq!(chat.status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(error_code(&chat.body), Some("provider_unavailable"));
    let message = chat.body["error"]["message"].as_str().unwrap_or_default();
    assert!(message.contains("http://127.0.0.1:9"), "{message}");

    let status = send_json(&app, request(Method::GET, "/provider/status", None, None)).await;
    assert_eq!(status.status, StatusCode::OK);
    assert_eq!(status.body["available"], false);
    assert!(status.body["error"].is_string());
}
