use std::sync::Arc;

use chrono::Utc;

use echoverse_api::{AppStateInner, router};
use echoverse_client::{Backend, FeedPage, FeedView, HttpBackend, Route, Toast, ToastLog};
use echoverse_db::Database;
use echoverse_types::models::ReactionType;

async fn spawn_service() -> String {
    let state = Arc::new(AppStateInner {
        db: Database::open_in_memory().unwrap(),
        jwt_secret: "e2e-secret".to_string(),
    });
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router(state)).await.unwrap();
    });
    format!("http://{addr}")
}

#[tokio::test(flavor = "multi_thread")]
async fn full_feed_flow() {
    let base_url = spawn_service().await;
    let backend = Arc::new(HttpBackend::new(&base_url));
    let toasts = Arc::new(ToastLog::new());
    let mut page = FeedPage::new(backend.clone(), toasts.clone());

    page.mount().await;
    assert_eq!(page.route(), Route::Auth);
    assert_eq!(page.view(Utc::now()), FeedView::SignedOut);

    backend.sign_up("alice", "correct-horse").await.unwrap();
    assert!(page.next_session_change().await);
    assert_eq!(page.route(), Route::Feed);
    assert_eq!(page.view(Utc::now()), FeedView::Empty);

    // rejected client-side
    page.composer_mut().unwrap().set_content("tiny");
    assert!(!page.post_story().await);
    assert_eq!(toasts.last(), Some(Toast::error("Story must be at least 10 characters")));

    let composer = page.composer_mut().unwrap();
    composer.set_anonymous(false);
    composer.set_content("my very first echo on this server");
    assert!(page.post_story().await);
    assert_eq!(page.stories().len(), 1);
    let story_id = page.stories()[0].story.id;

    assert!(page.toggle_reaction(story_id, ReactionType::Heart).await);
    let view = page.card(story_id).unwrap().view(Utc::now());
    let heart = view.reactions.iter().find(|b| b.kind == ReactionType::Heart).unwrap();
    assert_eq!((heart.count, heart.active), (Some(1), true));
    assert_eq!(view.author_label, "alice");

    assert!(page.toggle_reaction(story_id, ReactionType::Heart).await);
    let view = page.card(story_id).unwrap().view(Utc::now());
    let heart = view.reactions.iter().find(|b| b.kind == ReactionType::Heart).unwrap();
    assert_eq!((heart.count, heart.active), (None, false));

    page.toggle_comments(story_id);
    page.card_mut(story_id).unwrap().set_comment_draft("replying to myself");
    assert!(page.add_comment(story_id).await);
    let view = page.card(story_id).unwrap().view(Utc::now());
    assert_eq!(view.comment_count, Some(1));
    assert_eq!(view.comments[0].alias, "Anonymous");

    page.logout().await;
    assert_eq!(page.route(), Route::Auth);
    assert_eq!(toasts.last(), Some(Toast::success("Logged out successfully")));
    assert!(backend.get_session().await.unwrap().is_none());
}

#[tokio::test(flavor = "multi_thread")]
async fn second_user_sees_shared_feed() {
    let base_url = spawn_service().await;

    let alice = Arc::new(HttpBackend::new(&base_url));
    alice.sign_up("alice", "correct-horse").await.unwrap();
    let mut alice_page = FeedPage::new(alice.clone(), Arc::new(ToastLog::new()));
    alice_page.mount().await;
    alice_page
        .composer_mut()
        .unwrap()
        .set_content("posted without my name on it");
    assert!(alice_page.post_story().await);

    let bob = Arc::new(HttpBackend::new(&base_url));
    bob.sign_up("bobby", "correct-horse").await.unwrap();
    let mut bob_page = FeedPage::new(bob.clone(), Arc::new(ToastLog::new()));
    bob_page.mount().await;

    let FeedView::Stories(cards) = bob_page.view(Utc::now()) else {
        panic!("expected alice's story");
    };
    assert_eq!(cards.len(), 1);
    assert_eq!(cards[0].author_label, "Anonymous");
    assert_eq!(cards[0].posted, "less than a minute ago");

    let story_id = cards[0].story_id;
    assert!(bob_page.toggle_reaction(story_id, ReactionType::Wow).await);

    alice_page.fetch_stories().await;
    let view = alice_page.card(story_id).unwrap().view(Utc::now());
    let wow = view.reactions.iter().find(|b| b.kind == ReactionType::Wow).unwrap();
    assert_eq!((wow.count, wow.active), (Some(1), false));
}

#[tokio::test(flavor = "multi_thread")]
async fn revoked_session_redirects_to_auth() {
    let base_url = spawn_service().await;

    let backend = Arc::new(HttpBackend::new(&base_url));
    backend.sign_up("alice", "correct-horse").await.unwrap();
    let toasts = Arc::new(ToastLog::new());
    let mut page = FeedPage::new(backend.clone(), toasts.clone());
    page.mount().await;

    // the same account signs out from a second client holding the same token
    let token = backend.get_session().await.unwrap().unwrap().access_token;
    reqwest::Client::new()
        .post(format!("{base_url}/auth/logout"))
        .bearer_auth(token)
        .send()
        .await
        .unwrap();

    page.fetch_stories().await;
    assert_eq!(toasts.last(), Some(Toast::error("Failed to load stories")));
    assert!(page.sync_session().await);
    assert_eq!(page.route(), Route::Auth);
}
