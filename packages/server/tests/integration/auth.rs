use serde_json::json;

use crate::common::{PASSWORD, TestApp, routes};

mod login {
    use super::*;

    #[tokio::test]
    async fn registered_account_can_authenticate() {
        let app = TestApp::spawn().await;
        app.register("alpha").await;

        let res = app
            .post_without_token(
                routes::AUTH,
                &json!({"username": "alpha", "password": PASSWORD}),
            )
            .await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["status"], 200);
        assert_eq!(res.body["success"], true);
        assert!(res.data()["accessToken"].is_string());
    }

    #[tokio::test]
    async fn wrong_password_is_rejected() {
        let app = TestApp::spawn().await;
        app.register("alpha").await;

        let res = app
            .post_without_token(
                routes::AUTH,
                &json!({"username": "alpha", "password": "not-the-password"}),
            )
            .await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["success"], false);
        assert_eq!(res.error_code(), "credentialError");
    }

    #[tokio::test]
    async fn unknown_username_is_rejected() {
        let app = TestApp::spawn().await;

        let res = app
            .post_without_token(
                routes::AUTH,
                &json!({"username": "nobody", "password": PASSWORD}),
            )
            .await;

        assert_eq!(res.status, 401);
        assert_eq!(res.error_code(), "credentialError");
    }

    #[tokio::test]
    async fn empty_credentials_are_a_parameter_error() {
        let app = TestApp::spawn().await;

        let res = app
            .post_without_token(routes::AUTH, &json!({"username": "", "password": ""}))
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.error_code(), "parametersError");
    }
}

mod token_handling {
    use super::*;

    #[tokio::test]
    async fn protected_endpoint_rejects_missing_token() {
        let app = TestApp::spawn().await;

        let res = app.get_without_token(routes::ME).await;

        assert_eq!(res.status, 401);
        assert_eq!(res.error_code(), "unauthorizedError");
    }

    #[tokio::test]
    async fn protected_endpoint_rejects_garbage_token() {
        let app = TestApp::spawn().await;

        let res = app.get_with_token(routes::ME, "not-a-jwt").await;

        assert_eq!(res.status, 401);
        assert_eq!(res.error_code(), "unauthorizedError");
    }

    #[tokio::test]
    async fn optional_auth_endpoint_degrades_bad_token_to_anonymous() {
        let app = TestApp::spawn().await;

        // A garbage token must not produce an error on a public endpoint.
        let res = app.get_with_token(routes::VIDEOS, "not-a-jwt").await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["success"], true);
    }

    #[tokio::test]
    async fn me_returns_private_profile() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_account("alpha").await;

        let res = app.get_with_token(routes::ME, &token).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.data()["username"], "alpha");
        assert_eq!(res.data()["email"], "alpha@example.com");
        assert_eq!(res.data()["verified"], false);
    }
}
