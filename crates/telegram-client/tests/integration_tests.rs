//! Integration tests for telegram-client.
//!
//! None of these talk to the real Bot API; they cover configuration,
//! payload parsing and retry policy.

use std::time::Duration;

use telegram_client::{
    entity_text, BotConfig, ReconnectConfig, SendMessageParams, Update, DEFAULT_API_URL,
};

mod config_tests {
    use super::*;

    #[test]
    fn test_bot_config_default() {
        let config = BotConfig::new("123:abc");
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.poll_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_method_url() {
        let config = BotConfig::new("123:abc").with_api_url("http://localhost:8081/");
        assert_eq!(
            config.method_url("getUpdates"),
            "http://localhost:8081/bot123:abc/getUpdates"
        );
    }

    #[test]
    fn test_request_timeout_outlives_poll() {
        let config = BotConfig::new("123:abc").with_poll_timeout(Duration::from_secs(50));
        assert!(config.request_timeout() > config.poll_timeout);
    }

    #[test]
    fn test_debug_hides_token() {
        let config = BotConfig::new("123:super-secret");
        let printed = format!("{:?}", config);
        assert!(!printed.contains("super-secret"));
    }
}

mod reconnect_tests {
    use super::*;

    #[test]
    fn test_backoff_grows_and_caps() {
        let config = ReconnectConfig::default();
        assert_eq!(config.delay_for_attempt(0), Duration::from_millis(500));
        assert_eq!(config.delay_for_attempt(1), Duration::from_millis(1000));
        assert_eq!(config.delay_for_attempt(2), Duration::from_millis(2000));
        assert_eq!(config.delay_for_attempt(20), Duration::from_secs(30));
    }

    #[test]
    fn test_retry_limit() {
        let unlimited = ReconnectConfig::default();
        assert!(unlimited.should_retry(1_000));

        let limited = ReconnectConfig {
            max_retries: Some(3),
            ..Default::default()
        };
        assert!(limited.should_retry(2));
        assert!(!limited.should_retry(3));
    }
}

mod payload_tests {
    use super::*;

    const GROUP_MENTION: &str = r#"{
        "update_id": 1001,
        "message": {
            "message_id": 5,
            "from": {"id": 7, "is_bot": false, "first_name": "Ann", "username": "ann"},
            "chat": {"id": -100200, "type": "supergroup", "title": "Readers"},
            "date": 1700000000,
            "text": "hello @rec_bot",
            "entities": [{"offset": 6, "length": 8, "type": "mention"}]
        }
    }"#;

    #[test]
    fn test_parse_group_mention() {
        let update: Update = serde_json::from_str(GROUP_MENTION).unwrap();
        let message = update.message.expect("message");
        assert_eq!(message.chat.id, -100200);
        assert!(!message.chat.is_private());
        assert_eq!(message.entities.len(), 1);

        let entity = &message.entities[0];
        assert!(entity.is_mention());
        assert_eq!(
            entity_text(message.body(), entity).as_deref(),
            Some("@rec_bot")
        );
    }

    #[test]
    fn test_parse_update_without_message() {
        let raw = r#"{"update_id": 1002, "callback_query": {"id": "x"}}"#;
        let update: Update = serde_json::from_str(raw).unwrap();
        assert!(update.message.is_none());
    }

    #[test]
    fn test_send_params_skip_empty_fields() {
        let value = serde_json::to_value(SendMessageParams::text(1, "hi")).unwrap();
        assert_eq!(value, serde_json::json!({"chat_id": 1, "text": "hi"}));
    }
}
