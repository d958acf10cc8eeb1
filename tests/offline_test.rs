//! Offline backend: data and session survive a restart

use skillswap::{Backend, Settings, SkillSwapPaths};
use skillswap_app::screens::{LoginScreen, OnboardingForm, SignupScreen, TeacherScreen};
use skillswap_session::LoginStatus;
use skillswap_store::StorePath;
use tempfile::TempDir;

fn paths(temp_dir: &TempDir) -> SkillSwapPaths {
    let paths = SkillSwapPaths::with_root(temp_dir.path());
    paths.ensure_directories().unwrap();
    paths
}

#[tokio::test]
async fn test_fresh_offline_backend_is_logged_out() {
    let temp_dir = TempDir::new().unwrap();
    let backend = Backend::offline(&paths(&temp_dir)).unwrap();

    assert!(backend.is_offline());
    let status = backend.session.initialize().await.unwrap();
    assert_eq!(status, LoginStatus::LoggedOut);
}

#[tokio::test]
async fn test_session_survives_restart() {
    let temp_dir = TempDir::new().unwrap();
    let paths = paths(&temp_dir);

    let uid = {
        let backend = Backend::offline(&paths).unwrap();
        let session = &backend.session;
        session.initialize().await.unwrap();

        let (account, _) = SignupScreen::new("ada@example.com", "secret1", "secret1")
            .submit(session)
            .await
            .unwrap();
        let form = OnboardingForm {
            name: "Ada".to_string(),
            skills_to_teach: "math, chess".to_string(),
            ..Default::default()
        };
        form.submit(session, &account).await.unwrap();

        backend.offline_auth().unwrap().verify_email("ada@example.com");
        LoginScreen::new("ada@example.com", "secret1")
            .submit(session)
            .await
            .unwrap();
        backend.save().unwrap();
        account.uid
    };

    assert!(paths.offline_store.exists());
    assert!(paths.offline_accounts.exists());

    let backend = Backend::offline(&paths).unwrap();
    let status = backend.session.initialize().await.unwrap();
    assert_eq!(status, LoginStatus::LoggedIn);
    assert_eq!(backend.session.current_uid(), Some(uid.clone()));
    assert_eq!(backend.session.profile().unwrap().name, "Ada");

    let store = backend.offline_store().unwrap();
    assert!(store.read(&StorePath::user(&uid)).is_some());
    assert!(store.read(&StorePath::topic("chess")).is_some());
}

#[tokio::test]
async fn test_unverified_login_is_refused_after_restart() {
    let temp_dir = TempDir::new().unwrap();
    let paths = paths(&temp_dir);

    {
        let backend = Backend::offline(&paths).unwrap();
        SignupScreen::new("bo@example.com", "secret1", "secret1")
            .submit(&backend.session)
            .await
            .unwrap();
        backend.save().unwrap();
    }

    let backend = Backend::offline(&paths).unwrap();
    let notice = LoginScreen::new("bo@example.com", "secret1")
        .submit(&backend.session)
        .await
        .unwrap_err();
    assert_eq!(notice.title, "Email Not Verified");
}

#[tokio::test]
async fn test_ratings_persist() {
    let temp_dir = TempDir::new().unwrap();
    let paths = paths(&temp_dir);

    let teacher = {
        let backend = Backend::offline(&paths).unwrap();
        let session = &backend.session;
        let auth = backend.offline_auth().unwrap();

        let teacher = auth.add_account("t@example.com", "secret1", true);
        auth.add_account("s@example.com", "secret1", true);
        LoginScreen::new("t@example.com", "secret1")
            .submit(session)
            .await
            .unwrap();
        OnboardingForm {
            name: "Teacher".to_string(),
            skills_to_teach: "piano".to_string(),
            ..Default::default()
        }
        .submit(session, &session.identity().unwrap())
        .await
        .unwrap();
        session.sign_out().await.unwrap();

        LoginScreen::new("s@example.com", "secret1")
            .submit(session)
            .await
            .unwrap();
        let mut screen = TeacherScreen::new(session.clone(), teacher.clone());
        screen.load().await.unwrap();
        screen.select_rating(5).unwrap();
        screen.submit_rating().await.unwrap();
        backend.save().unwrap();
        teacher
    };

    let backend = Backend::offline(&paths).unwrap();
    backend.session.initialize().await.unwrap();
    let mut screen = TeacherScreen::new(backend.session.clone(), teacher);
    screen.load().await.unwrap();
    assert_eq!(screen.summary().count, 1);
    assert_eq!(screen.average_label(), "5.0 / 5");
}

#[test]
fn test_online_requires_database_url() {
    let temp_dir = TempDir::new().unwrap();
    let settings = Settings::default();
    let err = Backend::connect(&settings, &paths(&temp_dir)).err().unwrap();
    assert!(err.to_string().contains("database_url"));
}

#[test]
fn test_offline_setting_skips_remote() {
    let temp_dir = TempDir::new().unwrap();
    let settings = Settings {
        offline: true,
        ..Default::default()
    };
    let backend = Backend::connect(&settings, &paths(&temp_dir)).unwrap();
    assert!(backend.is_offline());
}
