use super::*;

#[test]
fn validate_trims_name_and_email() {
    let form = SignupForm::validate("  Ana Souza ", " ana@example.com ", "secret1", "secret1").unwrap();
    assert_eq!(form.full_name, "Ana Souza");
    assert_eq!(form.email, "ana@example.com");
    assert_eq!(form.password, "secret1");
}

#[test]
fn validate_checks_fields_in_order() {
    assert_eq!(SignupForm::validate("", "bad", "1", "2"), Err(SignupError::MissingName));
    assert_eq!(SignupForm::validate("Ana", "bad", "1", "2"), Err(SignupError::InvalidEmail));
    assert_eq!(SignupForm::validate("Ana", "a@b.c", "12345", "12345"), Err(SignupError::PasswordTooShort));
    assert_eq!(SignupForm::validate("Ana", "a@b.c", "123456", "123457"), Err(SignupError::PasswordMismatch));
}

#[test]
fn password_length_counts_characters_not_bytes() {
    assert!(SignupForm::validate("Ana", "a@b.c", "ççççç", "ççççç").is_err());
    assert!(SignupForm::validate("Ana", "a@b.c", "çççççç", "çççççç").is_ok());
}

#[test]
fn error_messages_are_user_facing() {
    assert_eq!(SignupError::PasswordTooShort.to_string(), "A senha deve ter pelo menos 6 caracteres.");
    assert_eq!(SignupError::PasswordMismatch.to_string(), "As senhas não conferem.");
}

#[test]
fn callback_url_joins_origin() {
    assert_eq!(callback_url("https://app.example/"), "https://app.example/auth/callback");
    assert_eq!(callback_url("http://localhost:3000"), "http://localhost:3000/auth/callback");
}

#[test]
fn heading_per_flow() {
    assert_eq!(heading(&RegistrationFlow::Inaugural), "Agende sua aula inaugural");
    assert_eq!(heading(&RegistrationFlow::Enrollment), "Faça sua matrícula");
    assert_eq!(heading(&RegistrationFlow::Admin), "Criar conta");
}
