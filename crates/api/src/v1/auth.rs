//! Auth service config bodies.
//!
//! Every member is [`Nullable`]: the auth service distinguishes "leave as is"
//! (absent) from "reset to default" (null). Member families keyed by a
//! dynamic name (`hook_<hook>_*`, `external_<provider>_*`,
//! `mailer_subjects_<template>`, `mailer_templates_<template>_content`) are
//! kept in a flattened map and accessed through the `extra_*` helpers.

use super::Nullable;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Character-set requirement for passwords, as opaque transport constants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PasswordRequiredCharacters {
    /// No requirement.
    #[serde(rename = "")]
    Empty,
    /// Letters and digits.
    #[serde(rename = "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ:0123456789")]
    LettersDigits,
    /// Lowercase, uppercase and digits.
    #[serde(rename = "abcdefghijklmnopqrstuvwxyz:ABCDEFGHIJKLMNOPQRSTUVWXYZ:0123456789")]
    LowerUpperLettersDigits,
    /// Lowercase, uppercase, digits and symbols.
    #[serde(
        rename = "abcdefghijklmnopqrstuvwxyz:ABCDEFGHIJKLMNOPQRSTUVWXYZ:0123456789:!@#$%^&*()_+-=[]{};'\\\\:\"|<>?,./`~"
    )]
    LowerUpperLettersDigitsSymbols,
}

/// Captcha providers accepted by the auth service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptchaProvider {
    /// hCaptcha.
    Hcaptcha,
    /// Cloudflare Turnstile.
    Turnstile,
}

/// SMS providers accepted by the auth service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SmsProvider {
    /// Twilio messaging.
    Twilio,
    /// Twilio Verify.
    TwilioVerify,
    /// MessageBird.
    Messagebird,
    /// Textlocal.
    Textlocal,
    /// Vonage.
    Vonage,
}

macro_rules! auth_config_body {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
        pub struct $name {
            /// Site URL used in redirects.
            #[serde(default, skip_serializing_if = "Nullable::is_unset")]
            pub site_url: Nullable<String>,
            /// Comma-separated additional redirect URLs.
            #[serde(default, skip_serializing_if = "Nullable::is_unset")]
            pub uri_allow_list: Nullable<String>,
            /// Access token lifetime in seconds.
            #[serde(default, skip_serializing_if = "Nullable::is_unset")]
            pub jwt_exp: Nullable<i64>,
            /// Refresh token rotation.
            #[serde(default, skip_serializing_if = "Nullable::is_unset")]
            pub refresh_token_rotation_enabled: Nullable<bool>,
            /// Refresh token reuse interval in seconds.
            #[serde(default, skip_serializing_if = "Nullable::is_unset")]
            pub security_refresh_token_reuse_interval: Nullable<i64>,
            /// Manual identity linking.
            #[serde(default, skip_serializing_if = "Nullable::is_unset")]
            pub security_manual_linking_enabled: Nullable<bool>,
            /// Inverse of `auth.enable_signup`.
            #[serde(default, skip_serializing_if = "Nullable::is_unset")]
            pub disable_signup: Nullable<bool>,
            /// Anonymous sign-ins.
            #[serde(default, skip_serializing_if = "Nullable::is_unset")]
            pub external_anonymous_users_enabled: Nullable<bool>,
            /// Minimum password length.
            #[serde(default, skip_serializing_if = "Nullable::is_unset")]
            pub password_min_length: Nullable<i64>,
            /// Password character requirement.
            #[serde(default, skip_serializing_if = "Nullable::is_unset")]
            pub password_required_characters: Nullable<PasswordRequiredCharacters>,
            /// Anonymous sign-ins per hour per IP.
            #[serde(default, skip_serializing_if = "Nullable::is_unset")]
            pub rate_limit_anonymous_users: Nullable<i64>,
            /// Token refreshes per 5 minutes per IP.
            #[serde(default, skip_serializing_if = "Nullable::is_unset")]
            pub rate_limit_token_refresh: Nullable<i64>,
            /// Sign-ups and sign-ins per 5 minutes per IP.
            #[serde(default, skip_serializing_if = "Nullable::is_unset")]
            pub rate_limit_otp: Nullable<i64>,
            /// OTP and magic-link verifications per 5 minutes per IP.
            #[serde(default, skip_serializing_if = "Nullable::is_unset")]
            pub rate_limit_verify: Nullable<i64>,
            /// Emails sent per hour.
            #[serde(default, skip_serializing_if = "Nullable::is_unset")]
            pub rate_limit_email_sent: Nullable<i64>,
            /// SMS sent per hour.
            #[serde(default, skip_serializing_if = "Nullable::is_unset")]
            pub rate_limit_sms_sent: Nullable<i64>,
            /// Web3 sign-ins per 5 minutes per IP.
            #[serde(default, skip_serializing_if = "Nullable::is_unset")]
            pub rate_limit_web3: Nullable<i64>,
            /// Captcha toggle.
            #[serde(default, skip_serializing_if = "Nullable::is_unset")]
            pub security_captcha_enabled: Nullable<bool>,
            /// Captcha provider.
            #[serde(default, skip_serializing_if = "Nullable::is_unset")]
            pub security_captcha_provider: Nullable<CaptchaProvider>,
            /// Captcha secret (hashed in responses).
            #[serde(default, skip_serializing_if = "Nullable::is_unset")]
            pub security_captcha_secret: Nullable<String>,
            /// Maximum enrolled MFA factors.
            #[serde(default, skip_serializing_if = "Nullable::is_unset")]
            pub mfa_max_enrolled_factors: Nullable<i64>,
            /// TOTP enrollment.
            #[serde(default, skip_serializing_if = "Nullable::is_unset")]
            pub mfa_totp_enroll_enabled: Nullable<bool>,
            /// TOTP verification.
            #[serde(default, skip_serializing_if = "Nullable::is_unset")]
            pub mfa_totp_verify_enabled: Nullable<bool>,
            /// Phone MFA enrollment.
            #[serde(default, skip_serializing_if = "Nullable::is_unset")]
            pub mfa_phone_enroll_enabled: Nullable<bool>,
            /// Phone MFA verification.
            #[serde(default, skip_serializing_if = "Nullable::is_unset")]
            pub mfa_phone_verify_enabled: Nullable<bool>,
            /// Phone MFA OTP length.
            #[serde(default, skip_serializing_if = "Nullable::is_unset")]
            pub mfa_phone_otp_length: Nullable<i64>,
            /// Phone MFA message template.
            #[serde(default, skip_serializing_if = "Nullable::is_unset")]
            pub mfa_phone_template: Nullable<String>,
            /// Phone MFA resend interval in seconds.
            #[serde(default, skip_serializing_if = "Nullable::is_unset")]
            pub mfa_phone_max_frequency: Nullable<i64>,
            /// WebAuthn enrollment.
            #[serde(default, skip_serializing_if = "Nullable::is_unset")]
            pub mfa_web_authn_enroll_enabled: Nullable<bool>,
            /// WebAuthn verification.
            #[serde(default, skip_serializing_if = "Nullable::is_unset")]
            pub mfa_web_authn_verify_enabled: Nullable<bool>,
            /// Session lifetime cap in seconds (0 = unlimited).
            #[serde(default, skip_serializing_if = "Nullable::is_unset")]
            pub sessions_timebox: Nullable<i64>,
            /// Session inactivity timeout in seconds (0 = never).
            #[serde(default, skip_serializing_if = "Nullable::is_unset")]
            pub sessions_inactivity_timeout: Nullable<i64>,
            /// Email sign-up.
            #[serde(default, skip_serializing_if = "Nullable::is_unset")]
            pub external_email_enabled: Nullable<bool>,
            /// Require confirmation on both old and new email.
            #[serde(default, skip_serializing_if = "Nullable::is_unset")]
            pub mailer_secure_email_change_enabled: Nullable<bool>,
            /// Inverse of `auth.email.enable_confirmations`.
            #[serde(default, skip_serializing_if = "Nullable::is_unset")]
            pub mailer_autoconfirm: Nullable<bool>,
            /// Reauthentication before password change.
            #[serde(default, skip_serializing_if = "Nullable::is_unset")]
            pub security_update_password_require_reauthentication: Nullable<bool>,
            /// Email OTP length.
            #[serde(default, skip_serializing_if = "Nullable::is_unset")]
            pub mailer_otp_length: Nullable<i64>,
            /// Email OTP expiry in seconds.
            #[serde(default, skip_serializing_if = "Nullable::is_unset")]
            pub mailer_otp_exp: Nullable<i64>,
            /// SMTP host; empty disables custom SMTP.
            #[serde(default, skip_serializing_if = "Nullable::is_unset")]
            pub smtp_host: Nullable<String>,
            /// SMTP port, transported as a string.
            #[serde(default, skip_serializing_if = "Nullable::is_unset")]
            pub smtp_port: Nullable<String>,
            /// SMTP user.
            #[serde(default, skip_serializing_if = "Nullable::is_unset")]
            pub smtp_user: Nullable<String>,
            /// SMTP password (hashed in responses).
            #[serde(default, skip_serializing_if = "Nullable::is_unset")]
            pub smtp_pass: Nullable<String>,
            /// Sender address.
            #[serde(default, skip_serializing_if = "Nullable::is_unset")]
            pub smtp_admin_email: Nullable<String>,
            /// Sender display name.
            #[serde(default, skip_serializing_if = "Nullable::is_unset")]
            pub smtp_sender_name: Nullable<String>,
            /// Minimum seconds between emails to one address.
            #[serde(default, skip_serializing_if = "Nullable::is_unset")]
            pub smtp_max_frequency: Nullable<i64>,
            /// Phone sign-up.
            #[serde(default, skip_serializing_if = "Nullable::is_unset")]
            pub external_phone_enabled: Nullable<bool>,
            /// Inverse of `auth.sms.enable_confirmations`.
            #[serde(default, skip_serializing_if = "Nullable::is_unset")]
            pub sms_autoconfirm: Nullable<bool>,
            /// OTP message template.
            #[serde(default, skip_serializing_if = "Nullable::is_unset")]
            pub sms_template: Nullable<String>,
            /// Minimum seconds between messages to one number.
            #[serde(default, skip_serializing_if = "Nullable::is_unset")]
            pub sms_max_frequency: Nullable<i64>,
            /// Test OTPs as `phone=otp,phone=otp`.
            #[serde(default, skip_serializing_if = "Nullable::is_unset")]
            pub sms_test_otp: Nullable<String>,
            /// Active SMS provider.
            #[serde(default, skip_serializing_if = "Nullable::is_unset")]
            pub sms_provider: Nullable<SmsProvider>,
            /// Twilio account SID.
            #[serde(default, skip_serializing_if = "Nullable::is_unset")]
            pub sms_twilio_account_sid: Nullable<String>,
            /// Twilio auth token.
            #[serde(default, skip_serializing_if = "Nullable::is_unset")]
            pub sms_twilio_auth_token: Nullable<String>,
            /// Twilio message service SID.
            #[serde(default, skip_serializing_if = "Nullable::is_unset")]
            pub sms_twilio_message_service_sid: Nullable<String>,
            /// Twilio Verify account SID.
            #[serde(default, skip_serializing_if = "Nullable::is_unset")]
            pub sms_twilio_verify_account_sid: Nullable<String>,
            /// Twilio Verify auth token.
            #[serde(default, skip_serializing_if = "Nullable::is_unset")]
            pub sms_twilio_verify_auth_token: Nullable<String>,
            /// Twilio Verify message service SID.
            #[serde(default, skip_serializing_if = "Nullable::is_unset")]
            pub sms_twilio_verify_message_service_sid: Nullable<String>,
            /// MessageBird access key.
            #[serde(default, skip_serializing_if = "Nullable::is_unset")]
            pub sms_messagebird_access_key: Nullable<String>,
            /// MessageBird originator.
            #[serde(default, skip_serializing_if = "Nullable::is_unset")]
            pub sms_messagebird_originator: Nullable<String>,
            /// Textlocal API key.
            #[serde(default, skip_serializing_if = "Nullable::is_unset")]
            pub sms_textlocal_api_key: Nullable<String>,
            /// Textlocal sender.
            #[serde(default, skip_serializing_if = "Nullable::is_unset")]
            pub sms_textlocal_sender: Nullable<String>,
            /// Vonage API key.
            #[serde(default, skip_serializing_if = "Nullable::is_unset")]
            pub sms_vonage_api_key: Nullable<String>,
            /// Vonage API secret.
            #[serde(default, skip_serializing_if = "Nullable::is_unset")]
            pub sms_vonage_api_secret: Nullable<String>,
            /// Vonage sender.
            #[serde(default, skip_serializing_if = "Nullable::is_unset")]
            pub sms_vonage_from: Nullable<String>,
            /// Sign in with Solana.
            #[serde(default, skip_serializing_if = "Nullable::is_unset")]
            pub external_web3_solana_enabled: Nullable<bool>,
            /// Hook, provider and email-template members.
            #[serde(flatten)]
            pub extra: Map<String, Value>,
        }

        impl $name {
            /// Set a dynamic member.
            pub fn set_extra(&mut self, key: impl Into<String>, value: impl Into<Value>) {
                self.extra.insert(key.into(), value.into());
            }

            /// Read a dynamic string member; null and absent yield `None`.
            pub fn extra_str(&self, key: &str) -> Option<&str> {
                self.extra.get(key).and_then(Value::as_str)
            }

            /// Read a dynamic boolean member.
            pub fn extra_bool(&self, key: &str) -> Option<bool> {
                self.extra.get(key).and_then(Value::as_bool)
            }
        }
    };
}

auth_config_body!(
    /// `GET /v1/projects/{ref}/config/auth` response.
    AuthConfigResponse
);

auth_config_body!(
    /// `PATCH /v1/projects/{ref}/config/auth` body.
    UpdateAuthConfigBody
);
