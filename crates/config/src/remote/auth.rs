//! `[auth]` against the auth service config.
//!
//! Sub-blocks the user left out (`captcha`, `email.smtp`, individual hooks)
//! are neither pushed nor seeded, so platform defaults survive. Fields of a
//! locally disabled feature are not seeded either: their env references were
//! never resolved, and seeding them would only produce noise in the diff.

use super::{join_list, local_int, local_secs, push_secret, seed_secret, split_list, wire_int, wire_secs};
use crate::diff::diff_with_seed;
use crate::error::ConfigError;
use crate::schema::{
    AuthConfig, Captcha, CaptchaProvider, EmailConfig, HookConfig, MfaConfig,
    PasswordRequirements, SmsConfig, SmsProviderKind, SmtpConfig,
};
use std::collections::BTreeMap;
use supaconf_api::v1::{self, AuthConfigResponse, Nullable, UpdateAuthConfigBody};

/// Providers whose endpoint URL is configurable.
const URL_PROVIDERS: [&str; 4] = ["azure", "gitlab", "keycloak", "workos"];

/// Providers that support skipping the nonce check.
const NONCE_PROVIDERS: [&str; 1] = ["google"];

impl From<PasswordRequirements> for v1::PasswordRequiredCharacters {
    fn from(requirements: PasswordRequirements) -> Self {
        match requirements {
            PasswordRequirements::NoRequired => Self::Empty,
            PasswordRequirements::LettersDigits => Self::LettersDigits,
            PasswordRequirements::LowerUpperLettersDigits => Self::LowerUpperLettersDigits,
            PasswordRequirements::LowerUpperLettersDigitsSymbols => {
                Self::LowerUpperLettersDigitsSymbols
            },
        }
    }
}

impl From<v1::PasswordRequiredCharacters> for PasswordRequirements {
    fn from(characters: v1::PasswordRequiredCharacters) -> Self {
        match characters {
            v1::PasswordRequiredCharacters::Empty => Self::NoRequired,
            v1::PasswordRequiredCharacters::LettersDigits => Self::LettersDigits,
            v1::PasswordRequiredCharacters::LowerUpperLettersDigits => {
                Self::LowerUpperLettersDigits
            },
            v1::PasswordRequiredCharacters::LowerUpperLettersDigitsSymbols => {
                Self::LowerUpperLettersDigitsSymbols
            },
        }
    }
}

impl From<CaptchaProvider> for v1::CaptchaProvider {
    fn from(provider: CaptchaProvider) -> Self {
        match provider {
            CaptchaProvider::Hcaptcha => Self::Hcaptcha,
            CaptchaProvider::Turnstile => Self::Turnstile,
        }
    }
}

impl From<v1::CaptchaProvider> for CaptchaProvider {
    fn from(provider: v1::CaptchaProvider) -> Self {
        match provider {
            v1::CaptchaProvider::Hcaptcha => Self::Hcaptcha,
            v1::CaptchaProvider::Turnstile => Self::Turnstile,
        }
    }
}

impl From<SmsProviderKind> for v1::SmsProvider {
    fn from(kind: SmsProviderKind) -> Self {
        match kind {
            SmsProviderKind::Twilio => Self::Twilio,
            SmsProviderKind::TwilioVerify => Self::TwilioVerify,
            SmsProviderKind::Messagebird => Self::Messagebird,
            SmsProviderKind::Textlocal => Self::Textlocal,
            SmsProviderKind::Vonage => Self::Vonage,
        }
    }
}

impl From<v1::SmsProvider> for SmsProviderKind {
    fn from(provider: v1::SmsProvider) -> Self {
        match provider {
            v1::SmsProvider::Twilio => Self::Twilio,
            v1::SmsProvider::TwilioVerify => Self::TwilioVerify,
            v1::SmsProvider::Messagebird => Self::Messagebird,
            v1::SmsProvider::Textlocal => Self::Textlocal,
            v1::SmsProvider::Vonage => Self::Vonage,
        }
    }
}

fn text(value: &Nullable<String>) -> String {
    value.value_or_default()
}

fn hash(value: &Nullable<String>) -> Option<&str> {
    value.get().map(String::as_str)
}

fn smtp_enabled(email: &EmailConfig) -> bool {
    email.smtp.as_ref().is_some_and(|smtp| smtp.enabled)
}

/// Flatten test OTPs as `phone=otp,phone=otp`.
fn flatten_test_otp(otps: &BTreeMap<String, String>) -> String {
    otps.iter()
        .map(|(phone, otp)| format!("{phone}={otp}"))
        .collect::<Vec<_>>()
        .join(",")
}

fn parse_test_otp(text: &str) -> BTreeMap<String, String> {
    text.split(',')
        .filter_map(|pair| pair.split_once('='))
        .map(|(phone, otp)| (phone.trim().to_string(), otp.trim().to_string()))
        .filter(|(phone, _)| !phone.is_empty())
        .collect()
}

impl AuthConfig {
    /// PATCH body for the auth service.
    pub fn to_update_body(&self) -> UpdateAuthConfigBody {
        let mut body = UpdateAuthConfigBody {
            site_url: Nullable::Value(self.site_url.clone()),
            uri_allow_list: Nullable::Value(join_list(&self.additional_redirect_urls)),
            jwt_exp: Nullable::Value(wire_int(self.jwt_expiry)),
            refresh_token_rotation_enabled: Nullable::Value(self.enable_refresh_token_rotation),
            security_refresh_token_reuse_interval: Nullable::Value(wire_int(
                self.refresh_token_reuse_interval,
            )),
            security_manual_linking_enabled: Nullable::Value(self.enable_manual_linking),
            disable_signup: Nullable::Value(!self.enable_signup),
            external_anonymous_users_enabled: Nullable::Value(self.enable_anonymous_sign_ins),
            password_min_length: Nullable::Value(wire_int(self.minimum_password_length)),
            password_required_characters: Nullable::Value(self.password_requirements.into()),
            external_web3_solana_enabled: Nullable::Value(self.web3.solana.enabled),
            ..UpdateAuthConfigBody::default()
        };
        if let Some(captcha) = &self.captcha {
            captcha_to_body(captcha, &mut body);
        }
        hooks_to_body(&self.hook, &mut body);
        mfa_to_body(&self.mfa, &mut body);
        body.sessions_timebox = Nullable::Value(wire_secs(self.sessions.timebox));
        body.sessions_inactivity_timeout = Nullable::Value(wire_secs(self.sessions.inactivity_timeout));
        email_to_body(&self.email, &mut body);
        sms_to_body(&self.sms, &mut body);
        self.external_to_body(&mut body);
        self.rate_limit_to_body(&mut body);
        body
    }

    /// Seed this section from a remote response; cleartext secrets are kept.
    pub fn from_remote(&mut self, remote: &AuthConfigResponse) {
        self.site_url = text(&remote.site_url);
        self.additional_redirect_urls = split_list(&text(&remote.uri_allow_list));
        self.jwt_expiry = local_int(remote.jwt_exp.value_or_default());
        self.enable_refresh_token_rotation = remote.refresh_token_rotation_enabled.value_or_default();
        self.refresh_token_reuse_interval =
            local_int(remote.security_refresh_token_reuse_interval.value_or_default());
        self.enable_manual_linking = remote.security_manual_linking_enabled.value_or_default();
        self.enable_signup = !remote.disable_signup.value_or_default();
        self.enable_anonymous_sign_ins = remote.external_anonymous_users_enabled.value_or_default();
        self.minimum_password_length = local_int(remote.password_min_length.value_or_default());
        self.password_requirements = remote
            .password_required_characters
            .get()
            .map_or_else(PasswordRequirements::default, |characters| (*characters).into());
        self.web3.solana.enabled = remote.external_web3_solana_enabled.value_or_default();

        // Rate limits depend on the local smtp and sms state, so seed them first.
        self.rate_limit_from_remote(remote);
        if let Some(captcha) = &mut self.captcha {
            captcha_from_remote(captcha, remote);
        }
        hooks_from_remote(&mut self.hook, remote);
        mfa_from_remote(&mut self.mfa, remote);
        self.sessions.timebox = local_secs(remote.sessions_timebox.value_or_default());
        self.sessions.inactivity_timeout = local_secs(remote.sessions_inactivity_timeout.value_or_default());
        email_from_remote(&mut self.email, remote);
        sms_from_remote(&mut self.sms, remote);
        self.external_from_remote(remote);
    }

    /// Unified diff of local against remote; empty when in sync.
    pub fn diff_with_remote(&self, remote: &AuthConfigResponse) -> Result<String, ConfigError> {
        diff_with_seed("auth", self, |seeded| seeded.from_remote(remote))
    }

    fn rate_limit_to_body(&self, body: &mut UpdateAuthConfigBody) {
        let limits = &self.rate_limit;
        body.rate_limit_anonymous_users = Nullable::Value(wire_int(limits.anonymous_users));
        body.rate_limit_token_refresh = Nullable::Value(wire_int(limits.token_refresh));
        body.rate_limit_otp = Nullable::Value(wire_int(limits.sign_in_sign_ups));
        body.rate_limit_verify = Nullable::Value(wire_int(limits.token_verifications));
        body.rate_limit_web3 = Nullable::Value(wire_int(limits.web3));
        // The platform rejects these limits unless the matching sender is configured.
        if smtp_enabled(&self.email) {
            body.rate_limit_email_sent = Nullable::Value(wire_int(limits.email_sent));
        }
        if !self.sms.enabled_providers().is_empty() {
            body.rate_limit_sms_sent = Nullable::Value(wire_int(limits.sms_sent));
        }
    }

    fn rate_limit_from_remote(&mut self, remote: &AuthConfigResponse) {
        let smtp = smtp_enabled(&self.email);
        let sms = !self.sms.enabled_providers().is_empty();
        let limits = &mut self.rate_limit;
        limits.anonymous_users = local_int(remote.rate_limit_anonymous_users.value_or_default());
        limits.token_refresh = local_int(remote.rate_limit_token_refresh.value_or_default());
        limits.sign_in_sign_ups = local_int(remote.rate_limit_otp.value_or_default());
        limits.token_verifications = local_int(remote.rate_limit_verify.value_or_default());
        limits.web3 = local_int(remote.rate_limit_web3.value_or_default());
        if smtp {
            limits.email_sent = local_int(remote.rate_limit_email_sent.value_or_default());
        }
        if sms {
            limits.sms_sent = local_int(remote.rate_limit_sms_sent.value_or_default());
        }
    }

    fn external_to_body(&self, body: &mut UpdateAuthConfigBody) {
        for (name, provider) in &self.external {
            body.set_extra(format!("external_{name}_enabled"), provider.enabled);
            if !provider.enabled {
                continue;
            }
            body.set_extra(format!("external_{name}_client_id"), provider.client_id.clone());
            if let Nullable::Value(secret) = push_secret(&provider.secret) {
                body.set_extra(format!("external_{name}_secret"), secret);
            }
            if URL_PROVIDERS.contains(&name.as_str()) {
                body.set_extra(format!("external_{name}_url"), provider.url.clone());
            }
            if NONCE_PROVIDERS.contains(&name.as_str()) {
                body.set_extra(
                    format!("external_{name}_skip_nonce_check"),
                    provider.skip_nonce_check,
                );
            }
        }
    }

    fn external_from_remote(&mut self, remote: &AuthConfigResponse) {
        for (name, provider) in &mut self.external {
            if provider.enabled {
                provider.client_id = remote
                    .extra_str(&format!("external_{name}_client_id"))
                    .unwrap_or_default()
                    .to_string();
                seed_secret(
                    &mut provider.secret,
                    remote.extra_str(&format!("external_{name}_secret")),
                );
                if URL_PROVIDERS.contains(&name.as_str()) {
                    provider.url = remote
                        .extra_str(&format!("external_{name}_url"))
                        .unwrap_or_default()
                        .to_string();
                }
                if NONCE_PROVIDERS.contains(&name.as_str()) {
                    provider.skip_nonce_check = remote
                        .extra_bool(&format!("external_{name}_skip_nonce_check"))
                        .unwrap_or_default();
                }
            }
            provider.enabled = remote
                .extra_bool(&format!("external_{name}_enabled"))
                .unwrap_or_default();
        }
    }
}

fn captcha_to_body(captcha: &Captcha, body: &mut UpdateAuthConfigBody) {
    body.security_captcha_enabled = Nullable::Value(captcha.enabled);
    if captcha.enabled {
        body.security_captcha_provider = Nullable::Value(captcha.provider.into());
        body.security_captcha_secret = push_secret(&captcha.secret);
    }
}

fn captcha_from_remote(captcha: &mut Captcha, remote: &AuthConfigResponse) {
    if captcha.enabled {
        if let Some(provider) = remote.security_captcha_provider.get() {
            captcha.provider = (*provider).into();
        }
        seed_secret(&mut captcha.secret, hash(&remote.security_captcha_secret));
    }
    captcha.enabled = remote.security_captcha_enabled.value_or_default();
}

fn hooks_to_body(hooks: &HookConfig, body: &mut UpdateAuthConfigBody) {
    for (name, hook) in hooks.entries() {
        let Some(hook) = hook else {
            continue;
        };
        body.set_extra(format!("hook_{name}_enabled"), hook.enabled);
        if !hook.enabled {
            continue;
        }
        body.set_extra(format!("hook_{name}_uri"), hook.uri.clone());
        if let Nullable::Value(secret) = push_secret(&hook.secrets) {
            body.set_extra(format!("hook_{name}_secrets"), secret);
        }
    }
}

fn hooks_from_remote(hooks: &mut HookConfig, remote: &AuthConfigResponse) {
    for (name, hook) in hooks.entries_mut() {
        let Some(hook) = hook else {
            continue;
        };
        if hook.enabled {
            hook.uri = remote
                .extra_str(&format!("hook_{name}_uri"))
                .unwrap_or_default()
                .to_string();
            seed_secret(&mut hook.secrets, remote.extra_str(&format!("hook_{name}_secrets")));
        }
        hook.enabled = remote
            .extra_bool(&format!("hook_{name}_enabled"))
            .unwrap_or_default();
    }
}

fn mfa_to_body(mfa: &MfaConfig, body: &mut UpdateAuthConfigBody) {
    body.mfa_max_enrolled_factors = Nullable::Value(wire_int(mfa.max_enrolled_factors));
    body.mfa_totp_enroll_enabled = Nullable::Value(mfa.totp.enroll_enabled);
    body.mfa_totp_verify_enabled = Nullable::Value(mfa.totp.verify_enabled);
    body.mfa_phone_enroll_enabled = Nullable::Value(mfa.phone.enroll_enabled);
    body.mfa_phone_verify_enabled = Nullable::Value(mfa.phone.verify_enabled);
    body.mfa_phone_otp_length = Nullable::Value(wire_int(mfa.phone.otp_length));
    body.mfa_phone_template = Nullable::Value(mfa.phone.template.clone());
    body.mfa_phone_max_frequency = Nullable::Value(wire_secs(mfa.phone.max_frequency));
    body.mfa_web_authn_enroll_enabled = Nullable::Value(mfa.web_authn.enroll_enabled);
    body.mfa_web_authn_verify_enabled = Nullable::Value(mfa.web_authn.verify_enabled);
}

fn mfa_from_remote(mfa: &mut MfaConfig, remote: &AuthConfigResponse) {
    mfa.max_enrolled_factors = local_int(remote.mfa_max_enrolled_factors.value_or_default());
    mfa.totp.enroll_enabled = remote.mfa_totp_enroll_enabled.value_or_default();
    mfa.totp.verify_enabled = remote.mfa_totp_verify_enabled.value_or_default();
    if mfa.phone.enroll_enabled || mfa.phone.verify_enabled {
        mfa.phone.otp_length = local_int(remote.mfa_phone_otp_length.value_or_default());
        mfa.phone.template = text(&remote.mfa_phone_template);
        mfa.phone.max_frequency = local_secs(remote.mfa_phone_max_frequency.value_or_default());
    }
    mfa.phone.enroll_enabled = remote.mfa_phone_enroll_enabled.value_or_default();
    mfa.phone.verify_enabled = remote.mfa_phone_verify_enabled.value_or_default();
    mfa.web_authn.enroll_enabled = remote.mfa_web_authn_enroll_enabled.value_or_default();
    mfa.web_authn.verify_enabled = remote.mfa_web_authn_verify_enabled.value_or_default();
}

fn email_to_body(email: &EmailConfig, body: &mut UpdateAuthConfigBody) {
    body.external_email_enabled = Nullable::Value(email.enable_signup);
    body.mailer_secure_email_change_enabled = Nullable::Value(email.double_confirm_changes);
    body.mailer_autoconfirm = Nullable::Value(!email.enable_confirmations);
    body.security_update_password_require_reauthentication =
        Nullable::Value(email.secure_password_change);
    body.smtp_max_frequency = Nullable::Value(wire_secs(email.max_frequency));
    body.mailer_otp_length = Nullable::Value(wire_int(email.otp_length));
    body.mailer_otp_exp = Nullable::Value(wire_int(email.otp_expiry));
    if let Some(smtp) = &email.smtp {
        smtp_to_body(smtp, body);
    }
    for (name, template) in &email.template {
        if let Some(subject) = &template.subject {
            body.set_extra(format!("mailer_subjects_{name}"), subject.clone());
        }
        if let Some(content) = &template.content {
            body.set_extra(format!("mailer_templates_{name}_content"), content.clone());
        }
    }
}

fn email_from_remote(email: &mut EmailConfig, remote: &AuthConfigResponse) {
    email.enable_signup = remote.external_email_enabled.value_or_default();
    email.double_confirm_changes = remote.mailer_secure_email_change_enabled.value_or_default();
    email.enable_confirmations = !remote.mailer_autoconfirm.value_or_default();
    email.secure_password_change = remote
        .security_update_password_require_reauthentication
        .value_or_default();
    email.max_frequency = local_secs(remote.smtp_max_frequency.value_or_default());
    email.otp_length = local_int(remote.mailer_otp_length.value_or_default());
    email.otp_expiry = local_int(remote.mailer_otp_exp.value_or_default());
    if let Some(smtp) = &mut email.smtp {
        smtp_from_remote(smtp, remote);
    }
    for (name, template) in &mut email.template {
        if template.subject.is_some() {
            template.subject = remote
                .extra_str(&format!("mailer_subjects_{name}"))
                .map(str::to_string);
        }
        if template.content.is_some() {
            template.content = remote
                .extra_str(&format!("mailer_templates_{name}_content"))
                .map(str::to_string);
        }
    }
}

fn smtp_to_body(smtp: &SmtpConfig, body: &mut UpdateAuthConfigBody) {
    if !smtp.enabled {
        // An empty host switches custom SMTP off.
        body.smtp_host = Nullable::Value(String::new());
        return;
    }
    body.smtp_host = Nullable::Value(smtp.host.clone());
    body.smtp_port = Nullable::Value(smtp.port.to_string());
    body.smtp_user = Nullable::Value(smtp.user.clone());
    body.smtp_pass = push_secret(&smtp.pass);
    body.smtp_admin_email = Nullable::Value(smtp.admin_email.clone());
    body.smtp_sender_name = Nullable::Value(smtp.sender_name.clone());
}

fn smtp_from_remote(smtp: &mut SmtpConfig, remote: &AuthConfigResponse) {
    let host = remote.smtp_host.get().filter(|host| !host.is_empty());
    if smtp.enabled {
        smtp.host = host.cloned().unwrap_or_default();
        smtp.port = remote
            .smtp_port
            .get()
            .and_then(|port| port.parse().ok())
            .unwrap_or_default();
        smtp.user = text(&remote.smtp_user);
        seed_secret(&mut smtp.pass, hash(&remote.smtp_pass));
        smtp.admin_email = text(&remote.smtp_admin_email);
        smtp.sender_name = text(&remote.smtp_sender_name);
    }
    smtp.enabled = host.is_some();
}

fn sms_to_body(sms: &SmsConfig, body: &mut UpdateAuthConfigBody) {
    body.external_phone_enabled = Nullable::Value(sms.enable_signup);
    body.sms_max_frequency = Nullable::Value(wire_secs(sms.max_frequency));
    body.sms_autoconfirm = Nullable::Value(!sms.enable_confirmations);
    body.sms_template = Nullable::Value(sms.template.clone());
    // An empty list clears remote test OTPs.
    body.sms_test_otp = Nullable::Value(flatten_test_otp(&sms.test_otp));
    // The service keeps settings of one provider only: the enabled one.
    let Some(kind) = sms.enabled_providers().first().copied() else {
        return;
    };
    body.sms_provider = Nullable::Value(kind.into());
    match kind {
        SmsProviderKind::Twilio => {
            body.sms_twilio_account_sid = Nullable::Value(sms.twilio.account_sid.clone());
            body.sms_twilio_message_service_sid =
                Nullable::Value(sms.twilio.message_service_sid.clone());
            body.sms_twilio_auth_token = push_secret(&sms.twilio.auth_token);
        },
        SmsProviderKind::TwilioVerify => {
            body.sms_twilio_verify_account_sid =
                Nullable::Value(sms.twilio_verify.account_sid.clone());
            body.sms_twilio_verify_message_service_sid =
                Nullable::Value(sms.twilio_verify.message_service_sid.clone());
            body.sms_twilio_verify_auth_token = push_secret(&sms.twilio_verify.auth_token);
        },
        SmsProviderKind::Messagebird => {
            body.sms_messagebird_originator = Nullable::Value(sms.messagebird.originator.clone());
            body.sms_messagebird_access_key = push_secret(&sms.messagebird.access_key);
        },
        SmsProviderKind::Textlocal => {
            body.sms_textlocal_sender = Nullable::Value(sms.textlocal.sender.clone());
            body.sms_textlocal_api_key = push_secret(&sms.textlocal.api_key);
        },
        SmsProviderKind::Vonage => {
            body.sms_vonage_from = Nullable::Value(sms.vonage.from.clone());
            body.sms_vonage_api_key = Nullable::Value(sms.vonage.api_key.clone());
            body.sms_vonage_api_secret = push_secret(&sms.vonage.api_secret);
        },
    }
}

fn sms_from_remote(sms: &mut SmsConfig, remote: &AuthConfigResponse) {
    sms.enable_signup = remote.external_phone_enabled.value_or_default();
    sms.max_frequency = local_secs(remote.sms_max_frequency.value_or_default());
    sms.enable_confirmations = !remote.sms_autoconfirm.value_or_default();
    sms.template = text(&remote.sms_template);
    sms.test_otp = parse_test_otp(&text(&remote.sms_test_otp));

    if sms.twilio.enabled {
        sms.twilio.account_sid = text(&remote.sms_twilio_account_sid);
        sms.twilio.message_service_sid = text(&remote.sms_twilio_message_service_sid);
        seed_secret(&mut sms.twilio.auth_token, hash(&remote.sms_twilio_auth_token));
    }
    if sms.twilio_verify.enabled {
        sms.twilio_verify.account_sid = text(&remote.sms_twilio_verify_account_sid);
        sms.twilio_verify.message_service_sid = text(&remote.sms_twilio_verify_message_service_sid);
        seed_secret(
            &mut sms.twilio_verify.auth_token,
            hash(&remote.sms_twilio_verify_auth_token),
        );
    }
    if sms.messagebird.enabled {
        sms.messagebird.originator = text(&remote.sms_messagebird_originator);
        seed_secret(&mut sms.messagebird.access_key, hash(&remote.sms_messagebird_access_key));
    }
    if sms.textlocal.enabled {
        sms.textlocal.sender = text(&remote.sms_textlocal_sender);
        seed_secret(&mut sms.textlocal.api_key, hash(&remote.sms_textlocal_api_key));
    }
    if sms.vonage.enabled {
        sms.vonage.from = text(&remote.sms_vonage_from);
        sms.vonage.api_key = text(&remote.sms_vonage_api_key);
        seed_secret(&mut sms.vonage.api_secret, hash(&remote.sms_vonage_api_secret));
    }

    let active = remote.sms_provider.get().copied().map(SmsProviderKind::from);
    sms.twilio.enabled = active == Some(SmsProviderKind::Twilio);
    sms.twilio_verify.enabled = active == Some(SmsProviderKind::TwilioVerify);
    sms.messagebird.enabled = active == Some(SmsProviderKind::Messagebird);
    sms.textlocal.enabled = active == Some(SmsProviderKind::Textlocal);
    sms.vonage.enabled = active == Some(SmsProviderKind::Vonage);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::{CHANGED_SENTINEL, ORIGINAL_SENTINEL};
    use crate::schema::{EmailTemplate, ExternalProvider, HookEntry};
    use crate::secret::Secret;

    fn sealed(value: &str) -> Secret {
        let mut secret = Secret::plain(value);
        secret.seal(b"installation");
        secret
    }

    fn local() -> AuthConfig {
        let mut auth = AuthConfig {
            enabled: true,
            site_url: "http://127.0.0.1:3000".to_string(),
            additional_redirect_urls: vec!["https://127.0.0.1:3000".to_string()],
            jwt_expiry: 3600,
            enable_signup: true,
            minimum_password_length: 6,
            password_requirements: PasswordRequirements::LettersDigits,
            ..AuthConfig::default()
        };
        auth.hook.send_sms = Some(HookEntry {
            enabled: true,
            uri: "https://example.com/hook".to_string(),
            secrets: sealed("v1,whsec_hook"),
        });
        auth.external.insert(
            "github".to_string(),
            ExternalProvider {
                enabled: true,
                client_id: "client".to_string(),
                secret: sealed("github-secret"),
                ..ExternalProvider::default()
            },
        );
        auth
    }

    /// What the service would report after applying `body`, hashing secrets.
    fn applied(body: &UpdateAuthConfigBody, hash_key: &[u8]) -> AuthConfigResponse {
        let mut json = serde_json::to_value(body).unwrap_or_default();
        if let Some(members) = json.as_object_mut() {
            for (key, value) in members.iter_mut() {
                let is_secret = ["_secret", "_secrets", "_auth_token", "_access_key"]
                    .iter()
                    .any(|suffix| key.ends_with(suffix))
                    || key == "smtp_pass"
                    || key == "sms_textlocal_api_key";
                if let (true, Some(text)) = (is_secret, value.as_str()) {
                    *value = crate::secret::hash_secret(hash_key, text).into();
                }
            }
        }
        serde_json::from_value(json).unwrap_or_default()
    }

    #[test]
    fn enum_mappings_are_total() {
        for requirement in [
            PasswordRequirements::NoRequired,
            PasswordRequirements::LettersDigits,
            PasswordRequirements::LowerUpperLettersDigits,
            PasswordRequirements::LowerUpperLettersDigitsSymbols,
        ] {
            let wire: v1::PasswordRequiredCharacters = requirement.into();
            assert_eq!(PasswordRequirements::from(wire), requirement);
        }
        for provider in [CaptchaProvider::Hcaptcha, CaptchaProvider::Turnstile] {
            let wire: v1::CaptchaProvider = provider.into();
            assert_eq!(CaptchaProvider::from(wire), provider);
        }
        for kind in [
            SmsProviderKind::Twilio,
            SmsProviderKind::TwilioVerify,
            SmsProviderKind::Messagebird,
            SmsProviderKind::Textlocal,
            SmsProviderKind::Vonage,
        ] {
            let wire: v1::SmsProvider = kind.into();
            assert_eq!(SmsProviderKind::from(wire), kind);
        }
    }

    #[test]
    fn update_body_inverts_signup_and_flattens_lists() {
        let body = local().to_update_body();
        assert_eq!(body.disable_signup, Nullable::Value(false));
        assert_eq!(
            body.uri_allow_list,
            Nullable::Value("https://127.0.0.1:3000".to_string())
        );
        assert_eq!(
            body.password_required_characters,
            Nullable::Value(v1::PasswordRequiredCharacters::LettersDigits)
        );
        assert_eq!(body.extra_bool("hook_send_sms_enabled"), Some(true));
        assert_eq!(body.extra_str("hook_send_sms_secrets"), Some("v1,whsec_hook"));
        assert_eq!(body.extra_str("external_github_secret"), Some("github-secret"));
        assert!(body.extra.get("hook_send_email_enabled").is_none());
        assert!(body.rate_limit_email_sent.is_unset());
    }

    #[test]
    fn disabled_smtp_sends_empty_host() {
        let mut auth = local();
        auth.email.smtp = Some(SmtpConfig {
            enabled: false,
            ..SmtpConfig::default()
        });
        let body = auth.to_update_body();
        assert_eq!(body.smtp_host, Nullable::Value(String::new()));
        assert!(body.smtp_pass.is_unset());
    }

    #[test]
    fn pushed_config_reads_back_without_drift() -> Result<(), ConfigError> {
        let auth = local();
        let remote = applied(&auth.to_update_body(), b"installation");
        assert_eq!(auth.diff_with_remote(&remote)?, "");
        Ok(())
    }

    #[test]
    fn secret_drift_is_redacted() -> Result<(), ConfigError> {
        let auth = local();
        let remote = applied(&auth.to_update_body(), b"other-installation");
        let diff = auth.diff_with_remote(&remote)?;
        assert!(diff.contains(CHANGED_SENTINEL), "{diff}");
        assert!(diff.contains(ORIGINAL_SENTINEL), "{diff}");
        assert!(!diff.contains("whsec_hook"));
        assert!(!diff.contains("github-secret"));
        Ok(())
    }

    #[test]
    fn sms_provider_and_test_otp_round_trip() -> Result<(), ConfigError> {
        let mut auth = local();
        auth.sms.twilio.enabled = true;
        auth.sms.twilio.account_sid = "sid".to_string();
        auth.sms.twilio.message_service_sid = "msid".to_string();
        auth.sms.twilio.auth_token = sealed("token");
        auth.sms.test_otp = BTreeMap::from([
            ("4152127777".to_string(), "123456".to_string()),
            ("4152128888".to_string(), "654321".to_string()),
        ]);
        let body = auth.to_update_body();
        assert_eq!(body.sms_provider, Nullable::Value(v1::SmsProvider::Twilio));
        assert_eq!(
            body.sms_test_otp,
            Nullable::Value("4152127777=123456,4152128888=654321".to_string())
        );
        assert!(!body.rate_limit_sms_sent.is_unset());
        let remote = applied(&body, b"installation");
        assert_eq!(auth.diff_with_remote(&remote)?, "");
        Ok(())
    }

    #[test]
    fn remote_test_otp_is_cleared_when_none_configured() -> Result<(), ConfigError> {
        let auth = local();
        let body = auth.to_update_body();
        assert_eq!(body.sms_test_otp, Nullable::Value(String::new()));

        let remote = AuthConfigResponse {
            sms_test_otp: Nullable::Value("4152127777=123456".to_string()),
            ..applied(&body, b"installation")
        };
        let diff = auth.diff_with_remote(&remote)?;
        assert!(diff.contains("-4152127777 = \"123456\""), "{diff}");

        let pushed = applied(&auth.to_update_body(), b"installation");
        assert_eq!(auth.diff_with_remote(&pushed)?, "");
        Ok(())
    }

    #[test]
    fn email_templates_are_pushed_and_seeded() -> Result<(), ConfigError> {
        let mut auth = local();
        auth.email.template.insert(
            "invite".to_string(),
            EmailTemplate {
                subject: Some("Welcome".to_string()),
                content: Some("<h1>Hi</h1>".to_string()),
                content_path: "./templates/invite.html".to_string(),
            },
        );
        let body = auth.to_update_body();
        assert_eq!(body.extra_str("mailer_subjects_invite"), Some("Welcome"));
        assert_eq!(body.extra_str("mailer_templates_invite_content"), Some("<h1>Hi</h1>"));

        let mut remote = applied(&body, b"installation");
        remote.set_extra("mailer_subjects_invite", "Hello");
        let diff = auth.diff_with_remote(&remote)?;
        assert!(diff.contains("-subject = \"Hello\""), "{diff}");
        assert!(diff.contains("+subject = \"Welcome\""), "{diff}");
        Ok(())
    }

    #[test]
    fn absent_hooks_are_not_seeded() {
        let mut auth = AuthConfig::default();
        let mut remote = AuthConfigResponse::default();
        remote.set_extra("hook_send_email_enabled", true);
        auth.from_remote(&remote);
        assert!(auth.hook.send_email.is_none());
    }
}
