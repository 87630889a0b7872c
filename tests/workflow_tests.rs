mod common;

use approval_bot::BotError;
use approval_bot::core::models::FormSubmission;
use approval_bot::workflow::{ApprovalBot, CommandKind};
use common::{RecordingPlatform, approval_values, click, slash, submission};

#[test]
fn command_names_resolve_with_and_without_slash() {
    assert_eq!(CommandKind::from_name("/hello"), Some(CommandKind::Hello));
    assert_eq!(CommandKind::from_name("hello"), Some(CommandKind::Hello));
    assert_eq!(CommandKind::from_name("/echo-name"), Some(CommandKind::EchoName));
    assert_eq!(CommandKind::from_name("/say_name"), Some(CommandKind::EchoName));
    assert_eq!(
        CommandKind::from_name("/start-approval"),
        Some(CommandKind::StartApproval)
    );
    assert_eq!(
        CommandKind::from_name("/approval-test"),
        Some(CommandKind::StartApproval)
    );
    assert_eq!(CommandKind::from_name("/Hello"), None);
    assert_eq!(CommandKind::from_name("/weather"), None);
}

#[tokio::test]
async fn hello_greets_issuer_in_origin_channel() {
    let platform = RecordingPlatform::new();
    let bot = ApprovalBot::new(platform.clone());

    bot.handle_command(&slash("/hello", "U1", "")).await.unwrap();

    let posts = platform.posts();
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].channel, "C100");
    assert_eq!(posts[0].text, "Hello, <@U1>");
}

#[tokio::test]
async fn echo_name_embeds_text_verbatim() {
    for text in ["Ada", "  padded  ", "*bold* <@U9>", ""] {
        let platform = RecordingPlatform::new();
        let bot = ApprovalBot::new(platform.clone());

        bot.handle_command(&slash("/echo-name", "U1", text))
            .await
            .unwrap();

        let posts = platform.posts();
        assert_eq!(posts.len(), 1, "one reply for {text:?}");
        assert_eq!(posts[0].text, format!("Your name is {text}"));
    }
}

#[tokio::test]
async fn start_approval_opens_modal_with_trigger() {
    let platform = RecordingPlatform::new();
    let bot = ApprovalBot::new(platform.clone());

    bot.handle_command(&slash("/start-approval", "U1", ""))
        .await
        .unwrap();

    assert!(platform.posts().is_empty());
    let views = platform.views();
    assert_eq!(views.len(), 1);
    assert_eq!(views[0].0, "trigger.123");
    assert_eq!(views[0].1["callback_id"], "approval_request_modal");
}

#[tokio::test]
async fn modal_open_failure_is_reported_without_retry() {
    let platform = RecordingPlatform::failing_views();
    let bot = ApprovalBot::new(platform.clone());

    let err = bot
        .handle_command(&slash("/start-approval", "U1", ""))
        .await
        .unwrap_err();

    assert!(matches!(err, BotError::ApiError(_)));
    assert!(err.to_string().contains("expired_trigger_id"));
    assert_eq!(platform.views().len(), 1);
}

#[tokio::test]
async fn unknown_command_posts_nothing() {
    let platform = RecordingPlatform::new();
    let bot = ApprovalBot::new(platform.clone());

    bot.handle_command(&slash("/unknown", "U1", "x")).await.unwrap();

    assert!(platform.calls().is_empty());
}

#[tokio::test]
async fn submission_sends_one_request_to_approver() {
    let platform = RecordingPlatform::new();
    let bot = ApprovalBot::new(platform.clone());

    bot.handle_submission(&submission("U_REQ", "U_APP", "Need a new laptop"))
        .await
        .unwrap();

    let posts = platform.posts();
    assert_eq!(posts.len(), 1);
    let message = &posts[0];
    assert_eq!(message.channel, "U_APP");
    assert!(message.text.contains("Need a new laptop"));

    let blocks = message.blocks.as_ref().expect("blocks");
    let section = blocks[0]["text"]["text"].as_str().unwrap();
    assert!(section.contains("Need a new laptop"));

    let buttons = blocks[1]["elements"].as_array().unwrap();
    assert_eq!(buttons.len(), 2);
    for button in buttons {
        assert_eq!(button["value"], "U_REQ");
    }
}

#[tokio::test]
async fn submission_with_empty_text_still_sends() {
    let platform = RecordingPlatform::new();
    let bot = ApprovalBot::new(platform.clone());
    let empty = FormSubmission {
        callback_id: "approval_request_modal".into(),
        submitter_id: "U_REQ".into(),
        values: approval_values("U_APP", None),
    };

    bot.handle_submission(&empty).await.unwrap();

    let posts = platform.posts();
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].text, "Approval request from <@U_REQ>: ");
}

#[tokio::test]
async fn submission_without_approver_is_a_parse_error() {
    let platform = RecordingPlatform::new();
    let bot = ApprovalBot::new(platform.clone());
    let broken = FormSubmission {
        callback_id: "approval_request_modal".into(),
        submitter_id: "U_REQ".into(),
        values: serde_json::json!({}),
    };

    let err = bot.handle_submission(&broken).await.unwrap_err();

    assert!(matches!(err, BotError::ParseError(_)));
    assert!(platform.calls().is_empty());
}

#[tokio::test]
async fn submission_of_other_modal_is_ignored() {
    let platform = RecordingPlatform::new();
    let bot = ApprovalBot::new(platform.clone());
    let mut other = submission("U_REQ", "U_APP", "x");
    other.callback_id = "something_else".into();

    bot.handle_submission(&other).await.unwrap();

    assert!(platform.calls().is_empty());
}

#[tokio::test]
async fn failed_delivery_is_returned_not_retried() {
    let platform = RecordingPlatform::failing_posts();
    let bot = ApprovalBot::new(platform.clone());

    let err = bot
        .handle_submission(&submission("U_REQ", "U_APP", "x"))
        .await
        .unwrap_err();

    assert!(err.to_string().contains("Error sending approval request"));
    assert_eq!(platform.posts().len(), 1);
}

#[tokio::test]
async fn approve_click_notifies_requester() {
    let platform = RecordingPlatform::new();
    let bot = ApprovalBot::new(platform.clone());

    bot.handle_action(&click("approve_request", "U_REQ", "U_APP"))
        .await
        .unwrap();

    let posts = platform.posts();
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].channel, "U_REQ");
    assert_eq!(
        posts[0].text,
        "Your approval request has been *approved* by <@U_APP>."
    );
}

#[tokio::test]
async fn reject_click_notifies_requester() {
    let platform = RecordingPlatform::new();
    let bot = ApprovalBot::new(platform.clone());

    bot.handle_action(&click("reject_request", "U_REQ", "U_APP"))
        .await
        .unwrap();

    let posts = platform.posts();
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].channel, "U_REQ");
    assert_eq!(
        posts[0].text,
        "Your approval request has been *rejected* by <@U_APP>."
    );
}

#[tokio::test]
async fn unrelated_action_is_ignored() {
    let platform = RecordingPlatform::new();
    let bot = ApprovalBot::new(platform.clone());

    bot.handle_action(&click("open_settings", "U_REQ", "U_APP"))
        .await
        .unwrap();

    assert!(platform.calls().is_empty());
}

#[tokio::test]
async fn repeated_click_notifies_twice_by_default() {
    let platform = RecordingPlatform::new();
    let bot = ApprovalBot::new(platform.clone());
    let approve = click("approve_request", "U_REQ", "U_APP");

    bot.handle_action(&approve).await.unwrap();
    bot.handle_action(&approve).await.unwrap();

    assert_eq!(platform.posts().len(), 2);
}

#[tokio::test]
async fn dedupe_suppresses_second_decision_on_same_message() {
    let platform = RecordingPlatform::new();
    let bot = ApprovalBot::new(platform.clone()).with_decision_dedupe();

    bot.handle_action(&click("approve_request", "U_REQ", "U_APP"))
        .await
        .unwrap();
    bot.handle_action(&click("reject_request", "U_REQ", "U_APP"))
        .await
        .unwrap();

    let posts = platform.posts();
    assert_eq!(posts.len(), 1);
    assert!(posts[0].text.contains("*approved*"));
}

#[tokio::test]
async fn dedupe_lets_a_click_retry_after_failed_notice() {
    let platform = RecordingPlatform::failing_posts();
    let bot = ApprovalBot::new(platform.clone()).with_decision_dedupe();
    let approve = click("approve_request", "U_REQ", "U_APP");

    let first = bot.handle_action(&approve).await;
    let second = bot.handle_action(&approve).await;

    assert!(matches!(first, Err(BotError::ApiError(_))));
    assert!(matches!(second, Err(BotError::ApiError(_))));
    assert_eq!(platform.posts().len(), 2);
}

#[tokio::test]
async fn dedupe_keeps_separate_messages_apart() {
    let platform = RecordingPlatform::new();
    let bot = ApprovalBot::new(platform.clone()).with_decision_dedupe();
    let first = click("approve_request", "U_REQ", "U_APP");
    let mut second = first.clone();
    second.message_ts = Some("1700000000.000002".into());

    bot.handle_action(&first).await.unwrap();
    bot.handle_action(&second).await.unwrap();

    assert_eq!(platform.posts().len(), 2);
}

#[tokio::test]
async fn self_approval_notifies_the_same_user() {
    let platform = RecordingPlatform::new();
    let bot = ApprovalBot::new(platform.clone());

    bot.handle_submission(&submission("U_SELF", "U_SELF", "my own request"))
        .await
        .unwrap();
    bot.handle_action(&click("approve_request", "U_SELF", "U_SELF"))
        .await
        .unwrap();

    let posts = platform.posts();
    assert_eq!(posts.len(), 2);
    assert_eq!(posts[0].channel, "U_SELF");
    assert_eq!(posts[1].channel, "U_SELF");
    assert_eq!(
        posts[1].text,
        "Your approval request has been *approved* by <@U_SELF>."
    );
}
