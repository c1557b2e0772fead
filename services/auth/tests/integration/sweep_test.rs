use chrono::{Duration, Utc};

use mangareader_auth::domain::types::CodePurpose;
use mangareader_auth::usecase::sweep::SweepExpiredCodesUseCase;

use crate::helpers::{MockCodeRepo, disabled_user, stored_code, test_user};

#[tokio::test]
async fn should_delete_only_expired_codes() {
    let a = test_user();
    let b = disabled_user();
    let repo = MockCodeRepo::new(vec![
        stored_code(&a, CodePurpose::PasswordReset, "1000000", Duration::hours(-2), false),
        stored_code(&b, CodePurpose::Registration, "100000", Duration::minutes(-1), true),
        stored_code(&b, CodePurpose::PasswordReset, "2000000", Duration::hours(1), false),
    ]);
    let codes = repo.codes_handle();

    let deleted = SweepExpiredCodesUseCase { codes: repo }
        .execute(Utc::now())
        .await
        .unwrap();

    assert_eq!(deleted, 2);
    let remaining = codes.lock().unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].code, "2000000");
}

#[tokio::test]
async fn should_be_idempotent() {
    let user = test_user();
    let repo = MockCodeRepo::new(vec![
        stored_code(&user, CodePurpose::Registration, "123456", Duration::days(-1), false),
        stored_code(&user, CodePurpose::PasswordReset, "1234567", Duration::hours(1), false),
    ]);
    let codes = repo.codes_handle();
    let uc = SweepExpiredCodesUseCase { codes: repo };

    let now = Utc::now();
    assert_eq!(uc.execute(now).await.unwrap(), 1);
    let after_first = codes.lock().unwrap().clone();

    assert_eq!(uc.execute(now).await.unwrap(), 0);
    assert_eq!(*codes.lock().unwrap(), after_first);
}

#[tokio::test]
async fn should_sweep_empty_store() {
    let uc = SweepExpiredCodesUseCase {
        codes: MockCodeRepo::empty(),
    };
    assert_eq!(uc.execute(Utc::now()).await.unwrap(), 0);
}
