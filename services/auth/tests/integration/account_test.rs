use chrono::Duration;

use mangareader_auth::domain::types::CodePurpose;
use mangareader_auth::error::AuthServiceError;
use mangareader_auth::usecase::account::{
    ActivateAccountUseCase, ForgotPasswordUseCase, RegisterInput, RegisterUseCase,
    ResendActivationUseCase, ResetPasswordInput, ResetPasswordUseCase,
};
use mangareader_auth::usecase::password::verify_password;

use crate::helpers::{
    FailingMailer, MockCodeRepo, MockUserRepo, RecordingMailer, TEST_PASSWORD, code_service,
    disabled_user, stored_code, test_user,
};

fn register_input(email: &str) -> RegisterInput {
    RegisterInput {
        username: "reader".to_owned(),
        email: email.to_owned(),
        password: "s3cret-pass".to_owned(),
    }
}

// ── Register ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_register_disabled_user_and_send_code() {
    let users = MockUserRepo::empty();
    let users_handle = users.users_handle();
    let repo = MockCodeRepo::empty();
    let codes = repo.codes_handle();
    let mailer = RecordingMailer::default();
    let sent = mailer.sent_handle();

    let uc = RegisterUseCase {
        users,
        codes: code_service(repo, mailer),
    };
    let user_id = uc.execute(register_input("  New@Example.com ")).await.unwrap();

    let users = users_handle.lock().unwrap();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0].id, user_id);
    assert_eq!(users[0].email, "new@example.com");
    assert!(!users[0].enabled, "new accounts start disabled");
    assert!(verify_password(&users[0].password_hash, "s3cret-pass"));

    let codes = codes.lock().unwrap();
    assert_eq!(codes.len(), 1);
    assert_eq!(codes[0].purpose, CodePurpose::Registration);
    assert_eq!(sent.lock().unwrap()[0].to, "new@example.com");
}

#[tokio::test]
async fn should_reject_registration_with_missing_fields() {
    let uc = RegisterUseCase {
        users: MockUserRepo::empty(),
        codes: code_service(MockCodeRepo::empty(), RecordingMailer::default()),
    };
    let mut input = register_input("new@example.com");
    input.username = "   ".to_owned();

    let result = uc.execute(input).await;
    assert!(matches!(result, Err(AuthServiceError::MissingData)));
}

#[tokio::test]
async fn should_reject_registration_for_taken_email() {
    let existing = test_user();
    let uc = RegisterUseCase {
        users: MockUserRepo::new(vec![existing.clone()]),
        codes: code_service(MockCodeRepo::empty(), RecordingMailer::default()),
    };

    let result = uc.execute(register_input("READER@example.com")).await;
    assert!(
        matches!(result, Err(AuthServiceError::UserAlreadyExists)),
        "expected UserAlreadyExists, got {result:?}"
    );
}

#[tokio::test]
async fn should_keep_registered_user_when_delivery_fails() {
    let users = MockUserRepo::empty();
    let users_handle = users.users_handle();
    let uc = RegisterUseCase {
        users,
        codes: code_service(MockCodeRepo::empty(), FailingMailer),
    };

    let result = uc.execute(register_input("new@example.com")).await;
    assert!(matches!(result, Err(AuthServiceError::DeliveryFailed(_))));
    assert_eq!(users_handle.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn should_register_despite_one_code_collision() {
    let users = MockUserRepo::empty();
    let users_handle = users.users_handle();
    let repo = MockCodeRepo::colliding_times(1);
    let codes = repo.codes_handle();
    let mailer = RecordingMailer::default();
    let sent = mailer.sent_handle();

    let uc = RegisterUseCase {
        users,
        codes: code_service(repo, mailer),
    };
    uc.execute(register_input("new@example.com")).await.unwrap();

    assert_eq!(users_handle.lock().unwrap().len(), 1);
    assert_eq!(codes.lock().unwrap().len(), 1);
    assert_eq!(sent.lock().unwrap().len(), 1);
}

// ── Activate ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_activate_user_and_consume_code() {
    let user = disabled_user();
    let record = stored_code(&user, CodePurpose::Registration, "123456", Duration::hours(24), false);
    let users = MockUserRepo::new(vec![user.clone()]);
    let users_handle = users.users_handle();
    let repo = MockCodeRepo::new(vec![record]).linked_to(&users);
    let codes = repo.codes_handle();

    let uc = ActivateAccountUseCase {
        users,
        codes: code_service(repo, RecordingMailer::default()),
    };
    uc.execute("123456").await.unwrap();

    assert!(users_handle.lock().unwrap()[0].enabled);
    assert!(codes.lock().unwrap().is_empty(), "code should be consumed");

    let replay = uc.execute("123456").await;
    assert!(matches!(replay, Err(AuthServiceError::CodeNotFound)));
}

#[tokio::test]
async fn should_not_activate_with_password_reset_code() {
    let user = disabled_user();
    let record = stored_code(&user, CodePurpose::PasswordReset, "1234567", Duration::hours(1), false);
    let users = MockUserRepo::new(vec![user]);
    let users_handle = users.users_handle();
    let repo = MockCodeRepo::new(vec![record]).linked_to(&users);

    let uc = ActivateAccountUseCase {
        users,
        codes: code_service(repo, RecordingMailer::default()),
    };
    let result = uc.execute("1234567").await;

    assert!(matches!(result, Err(AuthServiceError::InvalidCode)));
    assert!(!users_handle.lock().unwrap()[0].enabled);
}

#[tokio::test]
async fn should_keep_code_when_owner_is_missing() {
    let ghost = disabled_user();
    let record = stored_code(&ghost, CodePurpose::Registration, "123456", Duration::hours(24), false);
    let repo = MockCodeRepo::new(vec![record]);
    let codes = repo.codes_handle();

    let uc = ActivateAccountUseCase {
        users: MockUserRepo::empty(),
        codes: code_service(repo, RecordingMailer::default()),
    };
    let result = uc.execute("123456").await;

    assert!(matches!(result, Err(AuthServiceError::UserNotFound)));
    assert_eq!(codes.lock().unwrap().len(), 1, "nothing is spent when activation fails");
}

#[tokio::test]
async fn should_not_activate_with_expired_code() {
    let user = disabled_user();
    let record = stored_code(&user, CodePurpose::Registration, "123456", Duration::minutes(-1), false);
    let uc = ActivateAccountUseCase {
        users: MockUserRepo::new(vec![user]),
        codes: code_service(MockCodeRepo::new(vec![record]), RecordingMailer::default()),
    };
    let result = uc.execute("123456").await;
    assert!(matches!(result, Err(AuthServiceError::CodeExpired)));
}

// ── ForgotPassword / ResetPassword ───────────────────────────────────────────

#[tokio::test]
async fn should_send_password_reset_code() {
    let user = test_user();
    let repo = MockCodeRepo::empty();
    let codes = repo.codes_handle();
    let mailer = RecordingMailer::default();
    let sent = mailer.sent_handle();

    let uc = ForgotPasswordUseCase {
        users: MockUserRepo::new(vec![user.clone()]),
        codes: code_service(repo, mailer),
    };
    uc.execute("Reader@Example.com").await.unwrap();

    let codes = codes.lock().unwrap();
    assert_eq!(codes.len(), 1);
    assert_eq!(codes[0].purpose, CodePurpose::PasswordReset);
    assert_eq!(codes[0].code.len(), 7);
    assert_eq!(sent.lock().unwrap()[0].purpose, CodePurpose::PasswordReset);
}

#[tokio::test]
async fn should_refuse_password_reset_for_unknown_or_disabled_user() {
    let uc = ForgotPasswordUseCase {
        users: MockUserRepo::new(vec![disabled_user()]),
        codes: code_service(MockCodeRepo::empty(), RecordingMailer::default()),
    };

    let result = uc.execute("nobody@example.com").await;
    assert!(matches!(result, Err(AuthServiceError::UserNotFound)));

    let result = uc.execute("pending@example.com").await;
    assert!(matches!(result, Err(AuthServiceError::UserNotEnabled)));
}

#[tokio::test]
async fn should_reset_password_and_consume_code() {
    let user = test_user();
    let record = stored_code(&user, CodePurpose::PasswordReset, "1234567", Duration::hours(1), false);
    let users = MockUserRepo::new(vec![user.clone()]);
    let users_handle = users.users_handle();
    let repo = MockCodeRepo::new(vec![record]);
    let codes = repo.codes_handle();

    let uc = ResetPasswordUseCase {
        users,
        codes: code_service(repo, RecordingMailer::default()),
    };
    uc.execute(ResetPasswordInput {
        code: "1234567".to_owned(),
        password: "brand-new-pass".to_owned(),
    })
    .await
    .unwrap();

    let stored_hash = users_handle.lock().unwrap()[0].password_hash.clone();
    assert!(verify_password(&stored_hash, "brand-new-pass"));
    assert!(!verify_password(&stored_hash, TEST_PASSWORD));
    assert!(codes.lock().unwrap().is_empty());

    let replay = uc
        .execute(ResetPasswordInput {
            code: "1234567".to_owned(),
            password: "another-pass".to_owned(),
        })
        .await;
    assert!(
        matches!(replay, Err(AuthServiceError::CodeNotFound)),
        "reset codes must not be replayable, got {replay:?}"
    );
}

#[tokio::test]
async fn should_reject_reset_with_registration_code() {
    let user = test_user();
    let record = stored_code(&user, CodePurpose::Registration, "123456", Duration::hours(24), false);
    let uc = ResetPasswordUseCase {
        users: MockUserRepo::new(vec![user]),
        codes: code_service(MockCodeRepo::new(vec![record]), RecordingMailer::default()),
    };
    let result = uc
        .execute(ResetPasswordInput {
            code: "123456".to_owned(),
            password: "brand-new-pass".to_owned(),
        })
        .await;
    assert!(matches!(result, Err(AuthServiceError::InvalidCode)));
}

#[tokio::test]
async fn should_reject_reset_with_empty_password() {
    let uc = ResetPasswordUseCase {
        users: MockUserRepo::empty(),
        codes: code_service(MockCodeRepo::empty(), RecordingMailer::default()),
    };
    let result = uc
        .execute(ResetPasswordInput {
            code: "1234567".to_owned(),
            password: String::new(),
        })
        .await;
    assert!(matches!(result, Err(AuthServiceError::MissingData)));
}

// ── ResendActivation ─────────────────────────────────────────────────────────

#[tokio::test]
async fn should_resend_activation_replacing_previous_code() {
    let user = disabled_user();
    let old = stored_code(&user, CodePurpose::Registration, "111111", Duration::hours(24), false);
    let repo = MockCodeRepo::new(vec![old]);
    let codes = repo.codes_handle();

    let uc = ResendActivationUseCase {
        users: MockUserRepo::new(vec![user]),
        codes: code_service(repo, RecordingMailer::default()),
    };
    uc.execute("pending@example.com").await.unwrap();

    let codes = codes.lock().unwrap();
    assert_eq!(codes.len(), 1);
    assert_ne!(codes[0].code, "111111", "old code should be purged");
}

#[tokio::test]
async fn should_refuse_resend_for_enabled_user() {
    let uc = ResendActivationUseCase {
        users: MockUserRepo::new(vec![test_user()]),
        codes: code_service(MockCodeRepo::empty(), RecordingMailer::default()),
    };
    let result = uc.execute("reader@example.com").await;
    assert!(matches!(result, Err(AuthServiceError::UserAlreadyEnabled)));
}
