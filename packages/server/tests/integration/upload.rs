use crate::common::{TestApp, routes};

mod upload_signing {
    use super::*;

    #[tokio::test]
    async fn verified_account_gets_a_signed_upload_url() {
        let app = TestApp::spawn().await;
        let token = app.create_verified_account("alice").await;

        let res = app.get_with_token(routes::UPLOAD, &token).await;

        assert_eq!(res.status, 200);
        let url = res.data()["url"].as_str().unwrap();
        assert!(url.starts_with("https://media.example.com/test-cloud/auto/upload?"));
        assert!(url.contains("api_key=test-api-key"));
        assert!(url.contains("timestamp="));
        assert!(url.contains("signature="));
    }

    #[tokio::test]
    async fn unverified_account_cannot_sign_uploads() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_account("alice").await;

        let res = app.get_with_token(routes::UPLOAD, &token).await;

        assert_eq!(res.status, 403);
        assert_eq!(res.error_code(), "verifiedError");
    }

    #[tokio::test]
    async fn anonymous_caller_cannot_sign_uploads() {
        let app = TestApp::spawn().await;

        let res = app.get_without_token(routes::UPLOAD).await;

        assert_eq!(res.status, 401);
        assert_eq!(res.error_code(), "unauthorizedError");
    }
}

mod api_keys {
    use super::*;

    #[tokio::test]
    async fn api_key_is_created_once_and_stable() {
        let app = TestApp::spawn().await;
        let token = app.create_verified_account("alice").await;

        let first = app.get_with_token(routes::APIKEY, &token).await;
        assert_eq!(first.status, 200);
        let key = first.data()["apikey"].as_str().unwrap().to_string();
        assert!(!key.is_empty());

        let second = app.get_with_token(routes::APIKEY, &token).await;
        assert_eq!(second.data()["apikey"].as_str().unwrap(), key);
    }

    #[tokio::test]
    async fn unverified_account_cannot_get_an_api_key() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_account("alice").await;

        let res = app.get_with_token(routes::APIKEY, &token).await;

        assert_eq!(res.status, 403);
        assert_eq!(res.error_code(), "verifiedError");
    }
}
