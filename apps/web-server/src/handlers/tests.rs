use std::sync::{Arc, Mutex};

use actix_web::cookie::{Cookie, Key};
use actix_web::dev::ServiceResponse;
use actix_web::http::StatusCode;
use actix_web::http::header;
use actix_web::{App, test, web};
use async_trait::async_trait;

use quill_core::domain::{Comment, NewComment, NewPost, NewUser, Post, PostUpdate, User};
use quill_core::error::RepoError;
use quill_core::ports::{
    AuthError, CommentRepository, PasswordService, PostRepository, UserRepository,
};
use quill_shared::dto::{FormPage, LoginForm, PostForm, PostListPage, PostPage, RegisterForm};

use crate::session;
use crate::state::AppState;

/// In-memory record store double. Enforces the same uniqueness and
/// foreign-key rules the SQL schema does.
#[derive(Default)]
struct MemStore {
    users: Mutex<Vec<User>>,
    posts: Mutex<Vec<Post>>,
    comments: Mutex<Vec<Comment>>,
}

fn next_id<T>(rows: &[T], id_of: impl Fn(&T) -> i64) -> i64 {
    rows.iter().map(id_of).max().unwrap_or(0) + 1
}

#[async_trait]
impl UserRepository for MemStore {
    async fn insert(&self, draft: NewUser) -> Result<User, RepoError> {
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|u| u.email == draft.email) {
            return Err(RepoError::Constraint(
                "UNIQUE constraint failed: users.email".to_string(),
            ));
        }
        if draft.is_admin && users.iter().any(|u| u.is_admin) {
            return Err(RepoError::Constraint(
                "UNIQUE constraint failed: users.admin_slot".to_string(),
            ));
        }
        let user = User {
            id: next_id(&users, |u| u.id),
            name: draft.name,
            email: draft.email,
            password_hash: draft.password_hash,
            is_admin: draft.is_admin,
        };
        users.push(user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, RepoError> {
        Ok(self.users.lock().unwrap().iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn count(&self) -> Result<u64, RepoError> {
        Ok(self.users.lock().unwrap().len() as u64)
    }
}

#[async_trait]
impl PostRepository for MemStore {
    async fn insert(&self, draft: NewPost) -> Result<Post, RepoError> {
        let mut posts = self.posts.lock().unwrap();
        if posts.iter().any(|p| p.title == draft.title) {
            return Err(RepoError::Constraint("duplicate title".to_string()));
        }
        let post = Post {
            id: next_id(&posts, |p| p.id),
            author_id: draft.author_id,
            title: draft.title,
            subtitle: draft.subtitle,
            date: draft.date,
            body: draft.body,
            img_url: draft.img_url,
        };
        posts.push(post.clone());
        Ok(post)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Post>, RepoError> {
        Ok(self.posts.lock().unwrap().iter().find(|p| p.id == id).cloned())
    }

    async fn list_all(&self) -> Result<Vec<Post>, RepoError> {
        Ok(self.posts.lock().unwrap().clone())
    }

    async fn update(&self, id: i64, update: PostUpdate) -> Result<Post, RepoError> {
        let mut posts = self.posts.lock().unwrap();
        if posts.iter().any(|p| p.id != id && p.title == update.title) {
            return Err(RepoError::Constraint("duplicate title".to_string()));
        }
        let post = posts
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(RepoError::NotFound)?;
        post.title = update.title;
        post.subtitle = update.subtitle;
        post.body = update.body;
        post.img_url = update.img_url;
        Ok(post.clone())
    }

    async fn delete(&self, id: i64) -> Result<(), RepoError> {
        let mut posts = self.posts.lock().unwrap();
        let before = posts.len();
        posts.retain(|p| p.id != id);
        if posts.len() == before {
            return Err(RepoError::NotFound);
        }
        // Cascade, like the schema does.
        self.comments.lock().unwrap().retain(|c| c.post_id != id);
        Ok(())
    }
}

#[async_trait]
impl CommentRepository for MemStore {
    async fn insert(&self, draft: NewComment) -> Result<Comment, RepoError> {
        if !self
            .posts
            .lock()
            .unwrap()
            .iter()
            .any(|p| p.id == draft.post_id)
        {
            return Err(RepoError::NotFound);
        }
        let mut comments = self.comments.lock().unwrap();
        let comment = Comment {
            id: next_id(&comments, |c| c.id),
            post_id: draft.post_id,
            author_id: draft.author_id,
            body: draft.body,
        };
        comments.push(comment.clone());
        Ok(comment)
    }

    async fn find_by_post_id(&self, post_id: i64) -> Result<Vec<Comment>, RepoError> {
        Ok(self
            .comments
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.post_id == post_id)
            .cloned()
            .collect())
    }
}

/// User store whose `count()` always reports empty, the view a second
/// racer gets before the first registration commits.
struct StaleCountUsers(Arc<MemStore>);

#[async_trait]
impl UserRepository for StaleCountUsers {
    async fn insert(&self, draft: NewUser) -> Result<User, RepoError> {
        UserRepository::insert(self.0.as_ref(), draft).await
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, RepoError> {
        UserRepository::find_by_id(self.0.as_ref(), id).await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        self.0.find_by_email(email).await
    }

    async fn count(&self) -> Result<u64, RepoError> {
        Ok(0)
    }
}

/// Transparent password double so tests stay fast.
struct PlainPasswords;

impl PasswordService for PlainPasswords {
    fn hash(&self, password: &str) -> Result<String, AuthError> {
        Ok(format!("plain:{password}"))
    }

    fn verify(&self, password: &str, hash: &str) -> Result<bool, AuthError> {
        Ok(hash == format!("plain:{password}"))
    }
}

fn test_state() -> (Arc<MemStore>, AppState) {
    let store = Arc::new(MemStore::default());
    let state = AppState {
        users: store.clone(),
        posts: store.clone(),
        comments: store.clone(),
        passwords: Arc::new(PlainPasswords),
    };
    (store, state)
}

macro_rules! test_app {
    ($state:expr) => {
        test::init_service(
            App::new()
                .wrap(session::session_middleware(Key::generate(), false))
                .app_data(web::Data::new($state.clone()))
                .configure(crate::handlers::configure_routes),
        )
        .await
    };
}

fn session_cookie<B>(res: &ServiceResponse<B>) -> Cookie<'static> {
    res.response()
        .cookies()
        .find(|c| c.name() == "session")
        .expect("session cookie set")
        .into_owned()
}

fn location<B>(res: &ServiceResponse<B>) -> String {
    res.headers()
        .get(header::LOCATION)
        .expect("redirect location")
        .to_str()
        .unwrap()
        .to_string()
}

fn register_form(name: &str, email: &str, password: &str) -> RegisterForm {
    RegisterForm {
        name: name.to_string(),
        email: email.to_string(),
        password: password.to_string(),
    }
}

fn post_form(title: &str) -> PostForm {
    PostForm {
        title: title.to_string(),
        subtitle: "A subtitle".to_string(),
        body: "<p>Some content</p>".to_string(),
        img_url: "https://example.com/header.png".to_string(),
    }
}

macro_rules! register {
    ($app:expr, $name:expr, $email:expr, $password:expr) => {
        test::call_service(
            $app,
            test::TestRequest::post()
                .uri("/register")
                .set_form(register_form($name, $email, $password))
                .to_request(),
        )
        .await
    };
}

#[actix_web::test]
async fn first_registration_bootstraps_admin() {
    let (store, state) = test_state();
    let app = test_app!(state);

    let res = register!(&app, "Alice", "alice@x.com", "pw1");
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), "/");

    let res = register!(&app, "Bob", "bob@x.com", "pw2");
    assert_eq!(res.status(), StatusCode::SEE_OTHER);

    let users = store.users.lock().unwrap();
    assert_eq!(users.len(), 2);
    assert!(users[0].is_admin);
    assert!(!users[1].is_admin);
}

#[actix_web::test]
async fn racing_first_registrations_yield_one_admin() {
    // Both registrations observe an empty store; the admin slot's
    // unique index decides the winner and the loser retries as a
    // regular user.
    let store = Arc::new(MemStore::default());
    let state = AppState {
        users: Arc::new(StaleCountUsers(store.clone())),
        posts: store.clone(),
        comments: store.clone(),
        passwords: Arc::new(PlainPasswords),
    };
    let app = test_app!(state);

    let res = register!(&app, "Alice", "alice@x.com", "pw1");
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), "/");

    let res = register!(&app, "Bob", "bob@x.com", "pw2");
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), "/");

    let users = store.users.lock().unwrap();
    assert_eq!(users.len(), 2);
    assert_eq!(users.iter().filter(|u| u.is_admin).count(), 1);
    assert!(users[0].is_admin, "the first claimant keeps the slot");
}

#[actix_web::test]
async fn duplicate_email_adds_no_user() {
    let (store, state) = test_state();
    let app = test_app!(state);

    register!(&app, "Alice", "alice@x.com", "pw1");
    let res = register!(&app, "Alice Again", "alice@x.com", "pw2");

    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), "/login");
    assert_eq!(store.users.lock().unwrap().len(), 1);
}

#[actix_web::test]
async fn duplicate_email_flash_is_shown_once() {
    let (_store, state) = test_state();
    let app = test_app!(state);

    register!(&app, "Alice", "alice@x.com", "pw1");
    let res = register!(&app, "Alice Again", "alice@x.com", "pw2");
    let cookie = session_cookie(&res);

    let res = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/login")
            .cookie(cookie)
            .to_request(),
    )
    .await;
    let drained = session_cookie(&res);
    let page: FormPage = test::read_body_json(res).await;
    assert_eq!(
        page.flash,
        vec!["This email is already registered. Try logging in instead.".to_string()]
    );

    let res = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/login")
            .cookie(drained)
            .to_request(),
    )
    .await;
    let page: FormPage = test::read_body_json(res).await;
    assert!(page.flash.is_empty());
}

#[actix_web::test]
async fn unknown_email_and_wrong_password_are_indistinguishable() {
    let (_store, state) = test_state();
    let app = test_app!(state);

    register!(&app, "Alice", "alice@x.com", "pw1");

    let login = |email: &str, password: &str| {
        test::TestRequest::post()
            .uri("/login")
            .set_form(LoginForm {
                email: email.to_string(),
                password: password.to_string(),
            })
            .to_request()
    };

    let wrong_password = test::call_service(&app, login("alice@x.com", "nope")).await;
    let unknown_email = test::call_service(&app, login("nobody@x.com", "pw1")).await;

    assert_eq!(wrong_password.status(), unknown_email.status());
    assert_eq!(wrong_password.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&wrong_password), location(&unknown_email));
    assert_eq!(location(&wrong_password), "/login");
}

#[actix_web::test]
async fn login_binds_session() {
    let (_store, state) = test_state();
    let app = test_app!(state);

    register!(&app, "Alice", "alice@x.com", "pw1");

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/login")
            .set_form(LoginForm {
                email: "alice@x.com".to_string(),
                password: "pw1".to_string(),
            })
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), "/");
    let cookie = session_cookie(&res);

    let res = test::call_service(
        &app,
        test::TestRequest::get().uri("/").cookie(cookie).to_request(),
    )
    .await;
    let page: PostListPage = test::read_body_json(res).await;
    let current = page.current_user.expect("logged in");
    assert_eq!(current.name, "Alice");
    assert!(current.is_admin);
}

#[actix_web::test]
async fn create_post_is_admin_only() {
    let (store, state) = test_state();
    let app = test_app!(state);

    let alice = session_cookie(&register!(&app, "Alice", "alice@x.com", "pw1"));
    let bob = session_cookie(&register!(&app, "Bob", "bob@x.com", "pw2"));

    // Anonymous caller.
    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/new-post")
            .set_form(post_form("Hello"))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    // Logged-in non-admin.
    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/new-post")
            .cookie(bob)
            .set_form(post_form("Hello"))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    assert!(store.posts.lock().unwrap().is_empty());

    // The admin.
    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/new-post")
            .cookie(alice)
            .set_form(post_form("Hello"))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), "/");

    let posts = store.posts.lock().unwrap();
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].title, "Hello");
    assert_eq!(posts[0].author_id, 1);
}

#[actix_web::test]
async fn duplicate_title_is_recovered_with_flash() {
    let (store, state) = test_state();
    let app = test_app!(state);

    let alice = session_cookie(&register!(&app, "Alice", "alice@x.com", "pw1"));

    for _ in 0..2 {
        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/new-post")
                .cookie(alice.clone())
                .set_form(post_form("Hello"))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::SEE_OTHER);
    }

    assert_eq!(store.posts.lock().unwrap().len(), 1);
}

#[actix_web::test]
async fn anonymous_comment_is_rejected() {
    let (store, state) = test_state();
    let app = test_app!(state);

    let alice = session_cookie(&register!(&app, "Alice", "alice@x.com", "pw1"));
    test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/new-post")
            .cookie(alice)
            .set_form(post_form("Hello"))
            .to_request(),
    )
    .await;

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/post/1")
            .set_form(quill_shared::dto::CommentForm {
                body: "anonymous!".to_string(),
            })
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), "/login");
    assert!(store.comments.lock().unwrap().is_empty());
}

#[actix_web::test]
async fn logged_in_user_can_comment() {
    let (store, state) = test_state();
    let app = test_app!(state);

    let alice = session_cookie(&register!(&app, "Alice", "alice@x.com", "pw1"));
    test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/new-post")
            .cookie(alice)
            .set_form(post_form("Hello"))
            .to_request(),
    )
    .await;
    let bob = session_cookie(&register!(&app, "Bob", "bob@x.com", "pw2"));

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/post/1")
            .cookie(bob)
            .set_form(quill_shared::dto::CommentForm {
                body: "nice!".to_string(),
            })
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), "/post/1");

    let comments = store.comments.lock().unwrap();
    assert_eq!(comments.len(), 1);
    assert_eq!(comments[0].author_id, 2);
    assert_eq!(comments[0].body, "nice!");
}

#[actix_web::test]
async fn post_page_shows_comments_in_order() {
    let (_store, state) = test_state();
    let app = test_app!(state);

    let alice = session_cookie(&register!(&app, "Alice", "alice@x.com", "pw1"));
    test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/new-post")
            .cookie(alice.clone())
            .set_form(post_form("Hello"))
            .to_request(),
    )
    .await;
    for body in ["first", "second"] {
        test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/post/1")
                .cookie(alice.clone())
                .set_form(quill_shared::dto::CommentForm {
                    body: body.to_string(),
                })
                .to_request(),
        )
        .await;
    }

    let res = test::call_service(&app, test::TestRequest::get().uri("/post/1").to_request()).await;
    assert_eq!(res.status(), StatusCode::OK);
    let page: PostPage = test::read_body_json(res).await;
    assert_eq!(page.post.title, "Hello");
    assert_eq!(page.post.author, "Alice");
    assert!(page.current_user.is_none());
    assert_eq!(page.comments.len(), 2);
    assert_eq!(page.comments[0].body, "first");
    assert_eq!(page.comments[1].body, "second");
}

#[actix_web::test]
async fn missing_post_is_404() {
    let (_store, state) = test_state();
    let app = test_app!(state);

    let res = test::call_service(&app, test::TestRequest::get().uri("/post/99").to_request()).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn edit_preserves_author_and_date() {
    let (store, state) = test_state();
    let app = test_app!(state);

    let alice = session_cookie(&register!(&app, "Alice", "alice@x.com", "pw1"));
    test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/new-post")
            .cookie(alice.clone())
            .set_form(post_form("Hello"))
            .to_request(),
    )
    .await;
    let original_date = store.posts.lock().unwrap()[0].date.clone();

    let bob = session_cookie(&register!(&app, "Bob", "bob@x.com", "pw2"));
    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/edit-post/1")
            .cookie(bob)
            .set_form(post_form("Hijacked"))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/edit-post/1")
            .cookie(alice)
            .set_form(post_form("Hello, world"))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), "/post/1");

    let posts = store.posts.lock().unwrap();
    assert_eq!(posts[0].title, "Hello, world");
    assert_eq!(posts[0].author_id, 1);
    assert_eq!(posts[0].date, original_date);
}

#[actix_web::test]
async fn edit_missing_post_is_404() {
    let (_store, state) = test_state();
    let app = test_app!(state);

    let alice = session_cookie(&register!(&app, "Alice", "alice@x.com", "pw1"));
    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/edit-post/42")
            .cookie(alice)
            .set_form(post_form("Ghost"))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn delete_removes_post_and_comments() {
    let (store, state) = test_state();
    let app = test_app!(state);

    let alice = session_cookie(&register!(&app, "Alice", "alice@x.com", "pw1"));
    test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/new-post")
            .cookie(alice.clone())
            .set_form(post_form("Hello"))
            .to_request(),
    )
    .await;
    test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/post/1")
            .cookie(alice.clone())
            .set_form(quill_shared::dto::CommentForm {
                body: "doomed".to_string(),
            })
            .to_request(),
    )
    .await;

    let res = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/delete/1")
            .cookie(alice.clone())
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), "/");
    assert!(store.posts.lock().unwrap().is_empty());
    assert!(store.comments.lock().unwrap().is_empty());

    let res = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/delete/1")
            .cookie(alice)
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn logout_clears_the_binding() {
    let (_store, state) = test_state();
    let app = test_app!(state);

    // Anonymous logout is bounced to login.
    let res = test::call_service(&app, test::TestRequest::get().uri("/logout").to_request()).await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), "/login");

    let alice = session_cookie(&register!(&app, "Alice", "alice@x.com", "pw1"));
    let res = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/logout")
            .cookie(alice)
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), "/");
    let cleared = session_cookie(&res);

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/new-post")
            .cookie(cleared)
            .set_form(post_form("After logout"))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn invalid_post_input_is_rejected() {
    let (store, state) = test_state();
    let app = test_app!(state);

    let alice = session_cookie(&register!(&app, "Alice", "alice@x.com", "pw1"));
    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/new-post")
            .cookie(alice)
            .set_form(PostForm {
                title: "Hello".to_string(),
                subtitle: "Sub".to_string(),
                body: "Body".to_string(),
                img_url: "not a url".to_string(),
            })
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert!(store.posts.lock().unwrap().is_empty());
}
