use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};
use serde_json::json;

use server::entity::{account, subscription};

use crate::common::{PASSWORD, TestApp, routes};

mod registration {
    use super::*;

    #[tokio::test]
    async fn new_account_can_register_with_valid_fields() {
        let app = TestApp::spawn().await;

        let res = app
            .post_without_token(
                routes::ACCOUNTS,
                &json!({
                    "username": "alice.wonder",
                    "email": "alice@example.com",
                    "password": PASSWORD,
                }),
            )
            .await;

        assert_eq!(res.status, 201);
        assert_eq!(res.body["status"], 201);
        assert_eq!(res.body["success"], true);
    }

    #[tokio::test]
    async fn password_under_eight_characters_is_rejected_and_nothing_persists() {
        let app = TestApp::spawn().await;

        let res = app
            .post_without_token(
                routes::ACCOUNTS,
                &json!({
                    "username": "alice",
                    "email": "alice@example.com",
                    "password": "1234567",
                }),
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.error_code(), "validationError");

        let count = account::Entity::find().count(&app.db).await.unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn username_with_leading_underscore_is_rejected() {
        let app = TestApp::spawn().await;

        let res = app
            .post_without_token(
                routes::ACCOUNTS,
                &json!({
                    "username": "_alice",
                    "email": "alice@example.com",
                    "password": PASSWORD,
                }),
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.error_code(), "validationError");
    }

    #[tokio::test]
    async fn username_outside_length_bounds_is_rejected() {
        let app = TestApp::spawn().await;

        for username in ["abc", "a23456789012345678901"] {
            let res = app
                .post_without_token(
                    routes::ACCOUNTS,
                    &json!({
                        "username": username,
                        "email": "alice@example.com",
                        "password": PASSWORD,
                    }),
                )
                .await;

            assert_eq!(res.status, 400, "expected rejection for {username}");
            assert_eq!(res.error_code(), "validationError");
        }
    }

    #[tokio::test]
    async fn malformed_email_is_rejected() {
        let app = TestApp::spawn().await;

        for email in ["plain", "a@b", "a@.com", "spaced @b.co"] {
            let res = app
                .post_without_token(
                    routes::ACCOUNTS,
                    &json!({
                        "username": "alice",
                        "email": email,
                        "password": PASSWORD,
                    }),
                )
                .await;

            assert_eq!(res.status, 400, "expected rejection for {email}");
            assert_eq!(res.error_code(), "validationError");
        }
    }

    #[tokio::test]
    async fn missing_fields_are_a_parameter_error() {
        let app = TestApp::spawn().await;

        let res = app
            .post_without_token(routes::ACCOUNTS, &json!({"username": "alice"}))
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.error_code(), "parametersError");
    }

    #[tokio::test]
    async fn duplicate_username_leaves_exactly_one_record() {
        let app = TestApp::spawn().await;
        app.register("alice").await;

        let res = app
            .post_without_token(
                routes::ACCOUNTS,
                &json!({
                    "username": "alice",
                    "email": "other@example.com",
                    "password": PASSWORD,
                }),
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.error_code(), "duplicateKeyError");

        let count = account::Entity::find()
            .filter(account::Column::Username.eq("alice"))
            .count(&app.db)
            .await
            .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let app = TestApp::spawn().await;
        app.register("alice").await;

        let res = app
            .post_without_token(
                routes::ACCOUNTS,
                &json!({
                    "username": "bob.other",
                    "email": "alice@example.com",
                    "password": PASSWORD,
                }),
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.error_code(), "duplicateKeyError");
    }
}

mod profiles {
    use super::*;

    #[tokio::test]
    async fn public_profile_hides_sensitive_fields() {
        let app = TestApp::spawn().await;
        app.register("alice").await;
        let id = app.account_id("alice").await;

        let res = app.get_without_token(&routes::account(id)).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.data()["username"], "alice");
        assert!(res.data()["email"].is_null());
        assert!(res.data()["password"].is_null());
        assert!(res.data()["role"].is_null());
        assert_eq!(res.data()["subscribersTotal"], 0);
    }

    #[tokio::test]
    async fn unknown_account_is_not_found() {
        let app = TestApp::spawn().await;

        let res = app.get_without_token(&routes::account(999_999)).await;

        assert_eq!(res.status, 404);
        assert_eq!(res.error_code(), "notFoundError");
    }

    #[tokio::test]
    async fn listing_filters_by_username() {
        let app = TestApp::spawn().await;
        app.register("alice").await;
        app.register("bob.stone").await;

        let res = app
            .get_without_token(&format!("{}?username=alice", routes::ACCOUNTS))
            .await;

        assert_eq!(res.status, 200);
        let items = res.data().as_array().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["username"], "alice");
    }

    #[tokio::test]
    async fn owner_can_update_profile() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_account("alice").await;
        let id = app.account_id("alice").await;

        let res = app
            .put_with_token(
                &routes::account(id),
                &json!({"about": "hello there", "urlToAvatar": "https://img.example.com/a.png"}),
                &token,
            )
            .await;
        assert_eq!(res.status, 200);

        let profile = app.get_without_token(&routes::account(id)).await;
        assert_eq!(profile.data()["about"], "hello there");
        assert_eq!(
            profile.data()["urlToAvatar"],
            "https://img.example.com/a.png"
        );
    }

    #[tokio::test]
    async fn non_owner_cannot_update_profile() {
        let app = TestApp::spawn().await;
        app.register("alice").await;
        let other = app.create_authenticated_account("bob.stone").await;
        let id = app.account_id("alice").await;

        let res = app
            .put_with_token(&routes::account(id), &json!({"about": "defaced"}), &other)
            .await;

        assert_eq!(res.status, 403);
        assert_eq!(res.error_code(), "forbiddenError");
    }
}

mod verification {
    use super::*;

    #[tokio::test]
    async fn unprivileged_caller_cannot_verify_accounts() {
        let app = TestApp::spawn().await;
        app.register("alice").await;
        let token = app.create_authenticated_account("bob.stone").await;
        let id = app.account_id("alice").await;

        let res = app
            .put_with_token(&routes::account_verify(id), &json!({}), &token)
            .await;

        assert_eq!(res.status, 403);
        assert_eq!(res.error_code(), "forbiddenError");
    }

    #[tokio::test]
    async fn privileged_caller_can_verify_an_account() {
        let app = TestApp::spawn().await;
        app.register("alice").await;
        let admin = app.create_privileged_account("mod.erator").await;
        let id = app.account_id("alice").await;

        let res = app
            .put_with_token(&routes::account_verify(id), &json!({}), &admin)
            .await;
        assert_eq!(res.status, 200);

        let model = account::Entity::find_by_id(id)
            .one(&app.db)
            .await
            .unwrap()
            .unwrap();
        assert!(model.verified);
    }
}

mod subscriptions {
    use super::*;

    async fn subscribers_total(app: &TestApp, id: i32) -> i64 {
        account::Entity::find_by_id(id)
            .one(&app.db)
            .await
            .unwrap()
            .unwrap()
            .subscribers_total
    }

    #[tokio::test]
    async fn subscribing_increments_the_target_counter_exactly_once() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_account("alice").await;
        app.register("bob.stone").await;
        let target = app.account_id("bob.stone").await;

        let res = app
            .put_empty_with_token(&routes::account_subscribe(target), &token)
            .await;
        assert_eq!(res.status, 200);
        assert_eq!(subscribers_total(&app, target).await, 1);

        // Set semantics: a second subscribe is a no-op success.
        let res = app
            .put_empty_with_token(&routes::account_subscribe(target), &token)
            .await;
        assert_eq!(res.status, 200);
        assert_eq!(subscribers_total(&app, target).await, 1);

        let count = subscription::Entity::find().count(&app.db).await.unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn subscribe_then_unsubscribe_round_trips_to_the_original_state() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_account("alice").await;
        app.register("bob.stone").await;
        let me = app.account_id("alice").await;
        let target = app.account_id("bob.stone").await;

        app.put_empty_with_token(&routes::account_subscribe(target), &token)
            .await;
        let res = app
            .delete_with_token(&routes::account_subscribe(target), &token)
            .await;
        assert_eq!(res.status, 200);

        assert_eq!(subscribers_total(&app, target).await, 0);
        let subs = app
            .get_with_token(&routes::account_subscriptions(me), &token)
            .await;
        assert_eq!(subs.status, 200);
        assert_eq!(subs.data().as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn unsubscribing_a_non_member_is_a_no_op_success() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_account("alice").await;
        app.register("bob.stone").await;
        let target = app.account_id("bob.stone").await;

        let res = app
            .delete_with_token(&routes::account_subscribe(target), &token)
            .await;

        assert_eq!(res.status, 200);
        assert_eq!(subscribers_total(&app, target).await, 0);
    }

    #[tokio::test]
    async fn self_subscription_is_forbidden() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_account("alice").await;
        let me = app.account_id("alice").await;

        let res = app
            .put_empty_with_token(&routes::account_subscribe(me), &token)
            .await;

        assert_eq!(res.status, 403);
        assert_eq!(res.error_code(), "forbiddenError");
    }

    #[tokio::test]
    async fn subscribing_to_a_nonexistent_account_is_not_found() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_account("alice").await;

        let res = app
            .put_empty_with_token(&routes::account_subscribe(999_999), &token)
            .await;

        assert_eq!(res.status, 404);
        assert_eq!(res.error_code(), "notFoundError");
    }

    #[tokio::test]
    async fn subscription_list_is_owner_only() {
        let app = TestApp::spawn().await;
        app.register("alice").await;
        let other = app.create_authenticated_account("bob.stone").await;
        let id = app.account_id("alice").await;

        let res = app
            .get_with_token(&routes::account_subscriptions(id), &other)
            .await;

        assert_eq!(res.status, 403);
        assert_eq!(res.error_code(), "forbiddenError");
    }

    #[tokio::test]
    async fn subscribed_flag_appears_on_the_target_profile() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_account("alice").await;
        app.register("bob.stone").await;
        let target = app.account_id("bob.stone").await;

        app.put_empty_with_token(&routes::account_subscribe(target), &token)
            .await;

        let res = app.get_with_token(&routes::account(target), &token).await;
        assert_eq!(res.data()["isSubscribed"], true);

        let anon = app.get_without_token(&routes::account(target)).await;
        assert_eq!(anon.data()["isSubscribed"], false);
    }
}
