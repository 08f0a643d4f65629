use sea_orm::{EntityTrait, PaginatorTrait};
use serde_json::json;

use server::entity::{account, like, video};

use crate::common::{PASSWORD, TestApp, routes};

async fn video_likes_total(app: &TestApp, id: i32) -> i64 {
    video::Entity::find_by_id(id)
        .one(&app.db)
        .await
        .unwrap()
        .unwrap()
        .likes_total
}

async fn account_likes_total(app: &TestApp, id: i32) -> i64 {
    account::Entity::find_by_id(id)
        .one(&app.db)
        .await
        .unwrap()
        .unwrap()
        .likes_total
}

mod publishing {
    use super::*;

    #[tokio::test]
    async fn verified_account_can_publish_a_video() {
        let app = TestApp::spawn().await;
        let token = app.create_verified_account("alice").await;

        let res = app
            .post_with_token(
                routes::VIDEOS,
                &json!({
                    "title": "My first video",
                    "urlToVideo": "https://media.example.com/test-cloud/v/1.mp4",
                }),
                &token,
            )
            .await;

        assert_eq!(res.status, 201);
        assert_eq!(res.data()["title"], "My first video");
        assert_eq!(res.data()["category"], "general");
        assert_eq!(res.data()["likesTotal"], 0);
        assert_eq!(res.data()["account"]["username"], "alice");
    }

    #[tokio::test]
    async fn unverified_account_cannot_publish_and_nothing_persists() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_account("alice").await;

        let res = app
            .post_with_token(
                routes::VIDEOS,
                &json!({
                    "title": "My first video",
                    "urlToVideo": "https://media.example.com/test-cloud/v/1.mp4",
                }),
                &token,
            )
            .await;

        assert_eq!(res.status, 403);
        assert_eq!(res.error_code(), "verifiedError");

        let count = video::Entity::find().count(&app.db).await.unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn anonymous_caller_cannot_publish() {
        let app = TestApp::spawn().await;

        let res = app
            .post_without_token(
                routes::VIDEOS,
                &json!({
                    "title": "My first video",
                    "urlToVideo": "https://media.example.com/test-cloud/v/1.mp4",
                }),
            )
            .await;

        assert_eq!(res.status, 401);
        assert_eq!(res.error_code(), "unauthorizedError");
    }

    #[tokio::test]
    async fn short_title_is_rejected() {
        let app = TestApp::spawn().await;
        let token = app.create_verified_account("alice").await;

        let res = app
            .post_with_token(
                routes::VIDEOS,
                &json!({
                    "title": "abc",
                    "urlToVideo": "https://media.example.com/test-cloud/v/1.mp4",
                }),
                &token,
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.error_code(), "validationError");
    }

    #[tokio::test]
    async fn missing_video_url_is_a_parameter_error() {
        let app = TestApp::spawn().await;
        let token = app.create_verified_account("alice").await;

        let res = app
            .post_with_token(routes::VIDEOS, &json!({"title": "My video"}), &token)
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.error_code(), "parametersError");
    }

    #[tokio::test]
    async fn unknown_category_defaults_to_general() {
        let app = TestApp::spawn().await;
        let token = app.create_verified_account("alice").await;

        let res = app
            .post_with_token(
                routes::VIDEOS,
                &json!({
                    "title": "Uncategorizable",
                    "urlToVideo": "https://media.example.com/test-cloud/v/1.mp4",
                    "category": "nonsense",
                }),
                &token,
            )
            .await;
        assert_eq!(res.data()["category"], "general");

        let res = app
            .post_with_token(
                routes::VIDEOS,
                &json!({
                    "title": "Football highlights",
                    "urlToVideo": "https://media.example.com/test-cloud/v/2.mp4",
                    "category": "Sport",
                }),
                &token,
            )
            .await;
        assert_eq!(res.data()["category"], "sport");
    }
}

mod likes {
    use super::*;

    #[tokio::test]
    async fn liking_twice_leaves_one_join_record_and_counter_at_one() {
        let app = TestApp::spawn().await;
        let owner = app.create_verified_account("alice").await;
        let video_id = app.create_video(&owner, "A video to like").await;
        let token = app.create_authenticated_account("bob.stone").await;
        let bob = app.account_id("bob.stone").await;

        let res = app
            .put_empty_with_token(&routes::video_like(video_id), &token)
            .await;
        assert_eq!(res.status, 200);

        // Idempotent: the duplicate is a success and counts nothing.
        let res = app
            .put_empty_with_token(&routes::video_like(video_id), &token)
            .await;
        assert_eq!(res.status, 200);

        assert_eq!(video_likes_total(&app, video_id).await, 1);
        assert_eq!(account_likes_total(&app, bob).await, 1);
        let count = like::Entity::find().count(&app.db).await.unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn unliking_twice_from_zero_is_a_no_op_success() {
        let app = TestApp::spawn().await;
        let owner = app.create_verified_account("alice").await;
        let video_id = app.create_video(&owner, "Never liked").await;
        let token = app.create_authenticated_account("bob.stone").await;
        let bob = app.account_id("bob.stone").await;

        for _ in 0..2 {
            let res = app
                .delete_with_token(&routes::video_unlike(video_id), &token)
                .await;
            assert_eq!(res.status, 200);
        }

        assert_eq!(video_likes_total(&app, video_id).await, 0);
        assert_eq!(account_likes_total(&app, bob).await, 0);
    }

    #[tokio::test]
    async fn like_then_unlike_round_trips_both_counters() {
        let app = TestApp::spawn().await;
        let owner = app.create_verified_account("alice").await;
        let video_id = app.create_video(&owner, "Round trip").await;
        let token = app.create_authenticated_account("bob.stone").await;
        let bob = app.account_id("bob.stone").await;

        app.put_empty_with_token(&routes::video_like(video_id), &token)
            .await;
        app.delete_with_token(&routes::video_unlike(video_id), &token)
            .await;

        assert_eq!(video_likes_total(&app, video_id).await, 0);
        assert_eq!(account_likes_total(&app, bob).await, 0);
        let count = like::Entity::find().count(&app.db).await.unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn liking_a_nonexistent_video_is_not_found() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_account("alice").await;

        let res = app
            .put_empty_with_token(&routes::video_like(999_999), &token)
            .await;

        assert_eq!(res.status, 404);
        assert_eq!(res.error_code(), "notFoundError");
    }

    #[tokio::test]
    async fn liked_flag_appears_for_the_liker_only() {
        let app = TestApp::spawn().await;
        let owner = app.create_verified_account("alice").await;
        let video_id = app.create_video(&owner, "Flagged video").await;
        let token = app.create_authenticated_account("bob.stone").await;

        app.put_empty_with_token(&routes::video_like(video_id), &token)
            .await;

        let mine = app.get_with_token(&routes::video(video_id), &token).await;
        assert_eq!(mine.data()["isLiked"], true);

        let anon = app.get_without_token(&routes::video(video_id)).await;
        assert_eq!(anon.data()["isLiked"], false);
    }

    #[tokio::test]
    async fn liked_videos_appear_in_the_account_likes_listing() {
        let app = TestApp::spawn().await;
        let owner = app.create_verified_account("alice").await;
        let video_id = app.create_video(&owner, "Watched and liked").await;
        let token = app.create_authenticated_account("bob.stone").await;
        let bob = app.account_id("bob.stone").await;

        app.put_empty_with_token(&routes::video_like(video_id), &token)
            .await;

        let res = app
            .get_with_token(&routes::account_likes(bob), &token)
            .await;
        assert_eq!(res.status, 200);
        let items = res.data().as_array().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["video"]["id"], video_id);
        assert_eq!(items[0]["video"]["isLiked"], true);

        // The listing is private to its owner.
        let other = app.get_with_token(&routes::account_likes(bob), &owner).await;
        assert_eq!(other.status, 403);
    }
}

mod ownership {
    use super::*;

    #[tokio::test]
    async fn owner_can_update_their_video() {
        let app = TestApp::spawn().await;
        let token = app.create_verified_account("alice").await;
        let video_id = app.create_video(&token, "Original title").await;

        let res = app
            .put_with_token(
                &routes::video(video_id),
                &json!({"title": "Updated title", "category": "education"}),
                &token,
            )
            .await;

        assert_eq!(res.status, 200);
        assert_eq!(res.data()["title"], "Updated title");
        assert_eq!(res.data()["category"], "education");
    }

    #[tokio::test]
    async fn non_owner_cannot_update_or_delete() {
        let app = TestApp::spawn().await;
        let owner = app.create_verified_account("alice").await;
        let video_id = app.create_video(&owner, "Protected video").await;
        let other = app.create_authenticated_account("bob.stone").await;

        let res = app
            .put_with_token(&routes::video(video_id), &json!({"title": "Hacked"}), &other)
            .await;
        assert_eq!(res.status, 403);
        assert_eq!(res.error_code(), "forbiddenError");

        let res = app.delete_with_token(&routes::video(video_id), &other).await;
        assert_eq!(res.status, 403);
        assert_eq!(res.error_code(), "forbiddenError");
    }

    #[tokio::test]
    async fn privileged_role_can_delete_a_foreign_video() {
        let app = TestApp::spawn().await;
        let owner = app.create_verified_account("alice").await;
        let video_id = app.create_video(&owner, "Moderated away").await;
        let admin = app.create_privileged_account("mod.erator").await;

        let res = app.delete_with_token(&routes::video(video_id), &admin).await;
        assert_eq!(res.status, 200);

        let res = app.get_without_token(&routes::video(video_id)).await;
        assert_eq!(res.status, 404);
    }

    #[tokio::test]
    async fn deleting_a_video_cascades_comments_and_likes() {
        let app = TestApp::spawn().await;
        let owner = app.create_verified_account("alice").await;
        let video_id = app.create_video(&owner, "Doomed video").await;
        let commenter = app.create_verified_account("bob.stone").await;
        let bob = app.account_id("bob.stone").await;
        let comment_id = app.post_comment(video_id, &commenter, "nice").await;
        app.put_empty_with_token(&routes::video_like(video_id), &commenter)
            .await;

        let res = app.delete_with_token(&routes::video(video_id), &owner).await;
        assert_eq!(res.status, 200);

        let res = app.get_without_token(&routes::comment(comment_id)).await;
        assert_eq!(res.status, 404);
        let count = like::Entity::find().count(&app.db).await.unwrap();
        assert_eq!(count, 0);
        // The liker's aggregate counter walks back with the join record.
        assert_eq!(account_likes_total(&app, bob).await, 0);
    }
}

mod listing {
    use super::*;

    #[tokio::test]
    async fn listing_filters_by_title_substring() {
        let app = TestApp::spawn().await;
        let token = app.create_verified_account("alice").await;
        app.create_video(&token, "Cooking with rust").await;
        app.create_video(&token, "Gardening basics").await;

        let res = app
            .get_without_token(&format!("{}?title=RUST", routes::VIDEOS))
            .await;

        assert_eq!(res.status, 200);
        let items = res.data().as_array().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["title"], "Cooking with rust");
    }

    #[tokio::test]
    async fn non_public_videos_are_hidden_from_other_viewers() {
        let app = TestApp::spawn().await;
        let owner = app.create_verified_account("alice").await;
        let video_id = app.create_video(&owner, "Hidden video").await;
        app.put_with_token(&routes::video(video_id), &json!({"isPublic": false}), &owner)
            .await;

        let anon = app.get_without_token(&routes::video(video_id)).await;
        assert_eq!(anon.status, 404);

        let anon_list = app.get_without_token(routes::VIDEOS).await;
        assert_eq!(anon_list.data().as_array().unwrap().len(), 0);

        // The owner still sees it.
        let mine = app.get_with_token(&routes::video(video_id), &owner).await;
        assert_eq!(mine.status, 200);
    }
}

mod end_to_end {
    use super::*;

    #[tokio::test]
    async fn register_login_like_flow() {
        let app = TestApp::spawn().await;
        let owner = app.create_verified_account("creator").await;
        let video_id = app.create_video(&owner, "Launch video").await;

        let res = app
            .post_without_token(
                routes::ACCOUNTS,
                &json!({
                    "username": "alpha",
                    "email": "alpha@alpha.com",
                    "password": "12345678",
                }),
            )
            .await;
        assert_eq!(res.status, 201);

        let res = app
            .post_without_token(
                routes::AUTH,
                &json!({"username": "alpha", "password": "12345678"}),
            )
            .await;
        assert_eq!(res.status, 200);
        let token = res.data()["accessToken"].as_str().unwrap().to_string();

        let res = app
            .put_empty_with_token(&routes::video_like(video_id), &token)
            .await;
        assert_eq!(res.status, 200);

        let res = app.get_without_token(&routes::video(video_id)).await;
        assert_eq!(res.data()["likesTotal"], 1);
    }

    #[tokio::test]
    async fn password_is_not_stored_in_plaintext() {
        let app = TestApp::spawn().await;
        app.register("alice").await;

        let model = account::Entity::find()
            .one(&app.db)
            .await
            .unwrap()
            .unwrap();
        assert_ne!(model.password, PASSWORD);
        assert!(model.password.starts_with("$argon2"));
    }
}
