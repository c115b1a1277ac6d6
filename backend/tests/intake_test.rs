mod helpers;

use helpers::*;
use league_backend::catalog::GAMES;
use league_backend::models::*;
use league_backend::services::SubmitRegistration;
use rust_decimal::Decimal;
use std::collections::HashSet;

fn validation_fields(err: &league_backend::AppError) -> Vec<String> {
    err.validation_errors()
        .expect("validation error")
        .fields()
        .map(str::to_string)
        .collect()
}

#[tokio::test]
async fn test_unpriced_game_is_rejected_for_gender() {
    let app = TestApp::new();

    for game in GAMES {
        for gender in Gender::ALL {
            if game.price_for(gender).is_some() {
                continue;
            }
            let err = app
                .state
                .intake
                .submit(form(gender, &[game.name], "cash"))
                .await
                .unwrap_err();
            assert!(
                validation_fields(&err).contains(&"selectedGames".to_string()),
                "{} should not be selectable for {}",
                game.name,
                gender
            );
        }
    }

    assert!(app.registrations.is_empty().await);
}

#[tokio::test]
async fn test_total_is_sum_of_game_prices() {
    let app = TestApp::new();
    let registration = app
        .register_cash(Gender::Boys, &["Cricket", "Badminton Singles"])
        .await;

    assert_eq!(registration.total_amount, Decimal::new(2400, 0));
    assert_eq!(registration.discount, Some(Decimal::ZERO));
    assert_eq!(registration.final_amount(), Decimal::new(2400, 0));
}

#[tokio::test]
async fn test_team_game_needs_exactly_n_minus_one_members() {
    let app = TestApp::new();

    let mut short = form(Gender::Girls, &["Football"], "cash");
    short.team_members.insert("Football".into(), members(4));
    let err = app.state.intake.submit(short).await.unwrap_err();
    assert_eq!(validation_fields(&err), vec!["teamMembers.Football"]);

    let mut exact = form(Gender::Girls, &["Football"], "cash");
    exact.team_members.insert("Football".into(), members(5));
    let registration = app.state.intake.submit(exact).await.unwrap();
    assert_eq!(registration.team_members["Football"].len(), 5);
}

#[tokio::test]
async fn test_member_without_name_is_rejected() {
    let app = TestApp::new();
    let mut submission = form(Gender::Boys, &["Double Wicket"], "cash");
    submission
        .team_members
        .insert("Double Wicket".into(), vec![TeamMember {
            name: " ".into(),
            roll_number: "BSCS22M001".into(),
            contact_number: String::new(),
        }]);

    let err = app.state.intake.submit(submission).await.unwrap_err();
    assert_eq!(validation_fields(&err), vec!["teamMembers.Double Wicket[0].name"]);
}

#[tokio::test]
async fn test_missing_fields_are_all_reported() {
    let app = TestApp::new();
    let err = app
        .state
        .intake
        .submit(SubmitRegistration::default())
        .await
        .unwrap_err();

    assert_eq!(
        validation_fields(&err),
        vec![
            "email",
            "name",
            "rollNumber",
            "contactNumber",
            "gender",
            "selectedGames",
            "paymentMethod"
        ]
    );
}

#[tokio::test]
async fn test_malformed_contact_number_is_rejected() {
    let app = TestApp::new();
    let mut submission = form(Gender::Boys, &["Chess"], "cash");
    submission.contact_number = "12345".into();
    submission.alternative_contact_number = Some("0300 1234567".into());

    let err = app.state.intake.submit(submission).await.unwrap_err();
    assert_eq!(
        validation_fields(&err),
        vec!["contactNumber", "alternativeContactNumber"]
    );
}

#[tokio::test]
async fn test_fields_longer_than_their_columns_are_rejected() {
    let app = TestApp::new();
    let mut submission = form(Gender::Boys, &["Chess"], "cash");
    submission.roll_number = "R".repeat(limits::ROLL_NUMBER_MAX + 10);
    submission.name = "N".repeat(limits::NAME_MAX + 1);

    let err = app.state.intake.submit(submission).await.unwrap_err();
    assert!(!err.is_retryable());
    assert_eq!(validation_fields(&err), vec!["name", "rollNumber"]);
    assert!(app.registrations.is_empty().await);

    let mut submission = online_form(Gender::Girls, &["Tekken"]);
    submission.transaction_id = Some("T".repeat(limits::TRANSACTION_ID_MAX + 1));
    let err = app.state.intake.submit(submission).await.unwrap_err();
    assert_eq!(validation_fields(&err), vec!["transactionId"]);

    let mut submission = form(Gender::Boys, &["Chess"], "cash");
    submission.roll_number = "R".repeat(limits::ROLL_NUMBER_MAX);
    let registration = app.state.intake.submit(submission).await.unwrap();
    assert_eq!(registration.roll_number.len(), limits::ROLL_NUMBER_MAX);
}

#[tokio::test]
async fn test_online_payment_requires_transaction_and_proof() {
    let app = TestApp::new();

    let err = app
        .state
        .intake
        .submit(form(Gender::Girls, &["Ludo Singles"], "online"))
        .await
        .unwrap_err();
    assert_eq!(validation_fields(&err), vec!["transactionId", "paymentProof"]);

    let registration = app
        .state
        .intake
        .submit(online_form(Gender::Girls, &["Ludo Singles"]))
        .await
        .unwrap();
    assert_eq!(registration.status, RegistrationStatus::PendingOnline);
    assert_eq!(registration.transaction_id.as_deref(), Some("EP-99812345"));
    assert!(registration.slip_id.starts_with("WLG25-ONL-"));
}

#[tokio::test]
async fn test_cash_submission_ignores_payment_fields() {
    let app = TestApp::new();
    let submission = SubmitRegistration {
        transaction_id: Some("TX-1".into()),
        payment_proof: Some("https://uploads.example/x.png".into()),
        ..form(Gender::Boys, &["Uno"], "cash")
    };

    let registration = app.state.intake.submit(submission).await.unwrap();
    assert_eq!(registration.status, RegistrationStatus::PendingCash);
    assert_eq!(registration.transaction_id, None);
    assert_eq!(registration.payment_proof, None);
    assert!(registration.slip_id.starts_with("WLG25-CASH-"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_submissions_get_distinct_numbers() {
    let app = TestApp::new();

    let handles: Vec<_> = (0..32)
        .map(|_| {
            let intake = app.state.intake.clone();
            tokio::spawn(async move {
                intake
                    .submit(form(Gender::Boys, &["Chess"], "cash"))
                    .await
                    .unwrap()
                    .registration_number
            })
        })
        .collect();

    let mut numbers = HashSet::new();
    for handle in handles {
        let number = handle.await.unwrap();
        assert!(number >= 1);
        assert!(numbers.insert(number), "duplicate registration number {}", number);
    }
    assert_eq!(numbers.len(), 32);
}

#[tokio::test]
async fn test_closed_registration_refuses_submissions() {
    let app = TestApp::new();
    let admin = app.admin().await;
    app.state
        .settings
        .update(
            &admin,
            SettingsUpdate {
                is_open: false,
                open_date: None,
                close_date: None,
                announcement: Some("Registrations closed".into()),
            },
        )
        .await
        .unwrap();

    let err = app
        .state
        .intake
        .submit(form(Gender::Boys, &["Chess"], "cash"))
        .await
        .unwrap_err();
    assert_eq!(validation_fields(&err), vec!["registration"]);
    assert!(app.registrations.is_empty().await);
}

#[tokio::test]
async fn test_store_outage_is_retryable_and_writes_nothing() {
    let app = TestApp::new();
    app.registrations.set_available(false);

    let err = app
        .state
        .intake
        .submit(form(Gender::Boys, &["Chess"], "cash"))
        .await
        .unwrap_err();
    assert!(err.is_retryable());

    app.registrations.set_available(true);
    assert!(app.registrations.is_empty().await);

    let registration = app.register_cash(Gender::Boys, &["Chess"]).await;
    assert_eq!(registration.registration_number, 1);
}

#[tokio::test]
async fn test_selected_games_arrive_as_encoded_string() {
    let app = TestApp::new();
    let submission: SubmitRegistration = serde_json::from_value(serde_json::json!({
        "email": "zara@example.com",
        "name": "Zara",
        "rollNumber": "BSEF22M040",
        "contactNumber": "03001234567",
        "gender": "girls",
        "selectedGames": "[\"Chess\", \"Jenga\", \"Chess\"]",
        "paymentMethod": "cash",
        "totalAmount": 5
    }))
    .unwrap();

    let registration = app.state.intake.submit(submission).await.unwrap();
    assert_eq!(registration.selected_games.len(), 2);
    assert_eq!(registration.total_amount, Decimal::new(300, 0));
}
