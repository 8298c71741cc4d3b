//! `[auth]`: the auth service and everything hanging off it.

use crate::error::ConfigError;
use crate::jwt::Jwk;
use crate::secret::Secret;
use crate::units::GoDuration;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use supaconf_ports::{FileSystemPort, FileSystemPortExt};
use supaconf_shared::Result;

/// External OAuth providers the auth service knows about.
pub const EXTERNAL_PROVIDERS: [&str; 19] = [
    "apple",
    "azure",
    "bitbucket",
    "discord",
    "facebook",
    "figma",
    "github",
    "gitlab",
    "google",
    "kakao",
    "keycloak",
    "linkedin_oidc",
    "notion",
    "twitch",
    "twitter",
    "slack_oidc",
    "spotify",
    "workos",
    "zoom",
];

/// Providers that may omit the client secret.
pub const SECRETLESS_PROVIDERS: [&str; 2] = ["apple", "google"];

/// Email templates that can be customized.
pub const EMAIL_TEMPLATES: [&str; 6] = [
    "invite",
    "confirmation",
    "recovery",
    "magic_link",
    "email_change",
    "reauthentication",
];

/// Auth service settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Run the auth service.
    pub enabled: bool,
    /// Base URL used in redirects and email links.
    pub site_url: String,
    /// Other URLs allowed as redirect targets.
    pub additional_redirect_urls: Vec<String>,
    /// Access token lifetime in seconds.
    pub jwt_expiry: u32,
    /// Rotate refresh tokens on use.
    pub enable_refresh_token_rotation: bool,
    /// Grace period in seconds for reusing a rotated refresh token.
    pub refresh_token_reuse_interval: u32,
    /// Allow linking identities manually.
    pub enable_manual_linking: bool,
    /// Allow new sign-ups.
    pub enable_signup: bool,
    /// Allow anonymous sign-ins.
    pub enable_anonymous_sign_ins: bool,
    /// Shortest accepted password.
    pub minimum_password_length: u32,
    /// Required character classes.
    pub password_requirements: PasswordRequirements,
    /// JSON file with an array of JWKs used to sign API keys.
    pub signing_keys_path: String,
    /// HS256 secret; at least 16 characters.
    pub jwt_secret: Secret,
    /// Publishable key for the `anon` role; minted when empty.
    pub anon_key: Secret,
    /// Key for the `service_role` role; minted when empty.
    pub service_role_key: Secret,
    /// Keys loaded from `signing_keys_path`, or the generated default.
    #[serde(skip)]
    pub signing_keys: Vec<Jwk>,
    /// Per-endpoint rate limits.
    pub rate_limit: RateLimit,
    /// Captcha protection; absent when unconfigured.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub captcha: Option<Captcha>,
    /// Auth hooks.
    pub hook: HookConfig,
    /// Multi-factor auth.
    pub mfa: MfaConfig,
    /// Session limits.
    pub sessions: SessionsConfig,
    /// Email sign-in.
    pub email: EmailConfig,
    /// Phone sign-in.
    pub sms: SmsConfig,
    /// OAuth providers keyed by provider name.
    pub external: BTreeMap<String, ExternalProvider>,
    /// Web3 sign-in.
    pub web3: Web3Config,
    /// Third-party auth providers.
    pub third_party: ThirdPartyConfig,
}

impl AuthConfig {
    pub(crate) fn secrets_mut(&mut self) -> Vec<(String, &mut Secret)> {
        let mut secrets = vec![
            ("jwt_secret".to_string(), &mut self.jwt_secret),
            ("anon_key".to_string(), &mut self.anon_key),
            ("service_role_key".to_string(), &mut self.service_role_key),
        ];
        if let Some(captcha) = self.captcha.as_mut() {
            secrets.push(("captcha.secret".to_string(), &mut captcha.secret));
        }
        for (name, hook) in self.hook.entries_mut() {
            if let Some(hook) = hook {
                secrets.push((format!("hook.{name}.secrets"), &mut hook.secrets));
            }
        }
        if let Some(smtp) = self.email.smtp.as_mut() {
            secrets.push(("email.smtp.pass".to_string(), &mut smtp.pass));
        }
        let sms = &mut self.sms;
        secrets.push(("sms.twilio.auth_token".to_string(), &mut sms.twilio.auth_token));
        secrets.push((
            "sms.twilio_verify.auth_token".to_string(),
            &mut sms.twilio_verify.auth_token,
        ));
        secrets.push((
            "sms.messagebird.access_key".to_string(),
            &mut sms.messagebird.access_key,
        ));
        secrets.push(("sms.textlocal.api_key".to_string(), &mut sms.textlocal.api_key));
        secrets.push(("sms.vonage.api_secret".to_string(), &mut sms.vonage.api_secret));
        for (name, provider) in &mut self.external {
            secrets.push((format!("external.{name}.secret"), &mut provider.secret));
        }
        secrets
    }
}

/// Character classes a password must contain.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PasswordRequirements {
    /// No requirement.
    #[default]
    #[serde(rename = "")]
    NoRequired,
    LettersDigits,
    LowerUpperLettersDigits,
    LowerUpperLettersDigitsSymbols,
}

impl PasswordRequirements {
    /// Accepted spellings.
    pub const ALLOWED: [&'static str; 4] = [
        "",
        "letters_digits",
        "lower_upper_letters_digits",
        "lower_upper_letters_digits_symbols",
    ];
}

/// `[auth.rate_limit]`: per-hour (or per 5 minutes, per IP) caps.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimit {
    /// Anonymous sign-ins per hour per IP.
    pub anonymous_users: u32,
    /// Token refreshes per 5 minutes per IP.
    pub token_refresh: u32,
    /// Sign-ins and sign-ups per 5 minutes per IP.
    pub sign_in_sign_ups: u32,
    /// OTP and magic link verifications per 5 minutes per IP.
    pub token_verifications: u32,
    /// Emails sent per hour.
    pub email_sent: u32,
    /// SMS sent per hour.
    pub sms_sent: u32,
    /// Web3 sign-in.
    pub web3: u32,
}

/// `[auth.captcha]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Captcha {
    /// Require a captcha on sign-up and sign-in.
    pub enabled: bool,
    /// Captcha vendor.
    pub provider: CaptchaProvider,
    /// Provider secret.
    pub secret: Secret,
}

/// Captcha vendor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptchaProvider {
    #[default]
    Hcaptcha,
    Turnstile,
}

impl CaptchaProvider {
    /// Accepted spellings.
    pub const ALLOWED: [&'static str; 2] = ["hcaptcha", "turnstile"];
}

/// `[auth.hook]`: auth service extension points.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HookConfig {
    /// Called on each MFA verification.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mfa_verification_attempt: Option<HookEntry>,
    /// Called on each password check.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password_verification_attempt: Option<HookEntry>,
    /// Rewrites access token claims.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_access_token: Option<HookEntry>,
    /// Replaces the SMS sender.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub send_sms: Option<HookEntry>,
    /// Replaces the email sender.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub send_email: Option<HookEntry>,
    /// Runs before a user row is inserted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub before_user_created: Option<HookEntry>,
}

impl HookConfig {
    /// Hooks by config name, in a fixed order.
    pub fn entries(&self) -> [(&'static str, Option<&HookEntry>); 6] {
        [
            ("mfa_verification_attempt", self.mfa_verification_attempt.as_ref()),
            (
                "password_verification_attempt",
                self.password_verification_attempt.as_ref(),
            ),
            ("custom_access_token", self.custom_access_token.as_ref()),
            ("send_sms", self.send_sms.as_ref()),
            ("send_email", self.send_email.as_ref()),
            ("before_user_created", self.before_user_created.as_ref()),
        ]
    }

    /// Mutable counterpart of [`Self::entries`].
    pub fn entries_mut(&mut self) -> [(&'static str, Option<&mut HookEntry>); 6] {
        [
            ("mfa_verification_attempt", self.mfa_verification_attempt.as_mut()),
            (
                "password_verification_attempt",
                self.password_verification_attempt.as_mut(),
            ),
            ("custom_access_token", self.custom_access_token.as_mut()),
            ("send_sms", self.send_sms.as_mut()),
            ("send_email", self.send_email.as_mut()),
            ("before_user_created", self.before_user_created.as_mut()),
        ]
    }
}

/// One `[auth.hook.<name>]` block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HookEntry {
    /// Call this hook.
    pub enabled: bool,
    /// `http(s)://` endpoint or `pg-functions://<db>/<schema>/<function>`.
    pub uri: String,
    /// Signing secrets for HTTP hooks.
    pub secrets: Secret,
}

/// `[auth.mfa]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MfaConfig {
    /// Factors a user may enroll.
    pub max_enrolled_factors: u32,
    /// TOTP factor.
    pub totp: FactorToggle,
    /// Phone factor.
    pub phone: PhoneFactor,
    /// WebAuthn factor.
    pub web_authn: FactorToggle,
}

/// Enrollment and verification switches for one MFA factor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FactorToggle {
    /// Allow enrollment.
    pub enroll_enabled: bool,
    /// Allow verification.
    pub verify_enabled: bool,
}

/// `[auth.mfa.phone]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhoneFactor {
    /// Allow enrollment.
    pub enroll_enabled: bool,
    /// Allow verification.
    pub verify_enabled: bool,
    /// OTP digits.
    pub otp_length: u32,
    /// Message template.
    pub template: String,
    /// Minimum interval between messages.
    pub max_frequency: GoDuration,
}

/// `[auth.sessions]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionsConfig {
    /// Force log out after this long; zero disables.
    pub timebox: GoDuration,
    /// Force log out after this long without a refresh; zero disables.
    pub inactivity_timeout: GoDuration,
}

/// `[auth.email]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmailConfig {
    /// Allow new sign-ups.
    pub enable_signup: bool,
    /// Confirm email changes on both the old and new address.
    pub double_confirm_changes: bool,
    /// Require confirmation before sign-in.
    pub enable_confirmations: bool,
    /// Require recent sign-in before a password change.
    pub secure_password_change: bool,
    /// Email templates keyed by name.
    pub template: BTreeMap<String, EmailTemplate>,
    /// Custom SMTP server; absent uses the built-in one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub smtp: Option<SmtpConfig>,
    /// Minimum interval between messages.
    pub max_frequency: GoDuration,
    /// OTP digits.
    pub otp_length: u32,
    /// OTP lifetime in seconds.
    pub otp_expiry: u32,
}

impl EmailConfig {
    /// Read every template's `content_path`, relative to `project_root`.
    pub fn load_templates(&mut self, fs: &dyn FileSystemPort, project_root: &Path) -> Result<()> {
        for (name, template) in &mut self.template {
            if template.content_path.is_empty() {
                continue;
            }
            let path = project_root.join(&template.content_path);
            let content = fs.read_to_string(&path).map_err(|error| ConfigError::UnreadableConfig {
                path: path.display().to_string(),
                reason: format!("auth.email.template.{name}.content_path: {}", error.message),
            })?;
            template.content = Some(content);
        }
        Ok(())
    }
}

/// `[auth.email.template.<name>]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmailTemplate {
    /// Subject line.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    /// Loaded from `content_path`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// HTML body file, relative to the project root.
    pub content_path: String,
}

/// `[auth.email.smtp]`: custom SMTP server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmtpConfig {
    /// Send through this server.
    pub enabled: bool,
    /// SMTP host.
    pub host: String,
    /// SMTP port.
    pub port: u16,
    /// SMTP user.
    pub user: String,
    /// SMTP password.
    pub pass: Secret,
    /// Sender address.
    pub admin_email: String,
    /// Sender display name.
    pub sender_name: String,
}

impl Default for SmtpConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            host: String::new(),
            port: 0,
            user: String::new(),
            pass: Secret::default(),
            admin_email: String::new(),
            sender_name: String::new(),
        }
    }
}

/// `[auth.sms]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmsConfig {
    /// Allow new sign-ups.
    pub enable_signup: bool,
    /// Require confirmation before sign-in.
    pub enable_confirmations: bool,
    /// OTP message; `{{ .Code }}` is replaced by the code.
    pub template: String,
    /// Minimum interval between messages.
    pub max_frequency: GoDuration,
    /// Twilio.
    pub twilio: TwilioConfig,
    /// Twilio Verify.
    pub twilio_verify: TwilioConfig,
    /// MessageBird.
    pub messagebird: MessagebirdConfig,
    /// Textlocal.
    pub textlocal: TextlocalConfig,
    /// Vonage.
    pub vonage: VonageConfig,
    /// Fixed OTPs by phone number, for testing.
    pub test_otp: BTreeMap<String, String>,
}

/// SMS provider names, as used in config and on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SmsProviderKind {
    Twilio,
    TwilioVerify,
    Messagebird,
    Textlocal,
    Vonage,
}

impl SmsProviderKind {
    /// Config table name.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Twilio => "twilio",
            Self::TwilioVerify => "twilio_verify",
            Self::Messagebird => "messagebird",
            Self::Textlocal => "textlocal",
            Self::Vonage => "vonage",
        }
    }
}

impl SmsConfig {
    /// Providers switched on, in declaration order.
    pub fn enabled_providers(&self) -> Vec<SmsProviderKind> {
        [
            (SmsProviderKind::Twilio, self.twilio.enabled),
            (SmsProviderKind::TwilioVerify, self.twilio_verify.enabled),
            (SmsProviderKind::Messagebird, self.messagebird.enabled),
            (SmsProviderKind::Textlocal, self.textlocal.enabled),
            (SmsProviderKind::Vonage, self.vonage.enabled),
        ]
        .into_iter()
        .filter_map(|(kind, enabled)| enabled.then_some(kind))
        .collect()
    }
}

/// `[auth.sms.twilio]` and `[auth.sms.twilio_verify]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TwilioConfig {
    /// Use Twilio for SMS.
    pub enabled: bool,
    /// Account SID.
    pub account_sid: String,
    /// Messaging service SID.
    pub message_service_sid: String,
    /// Auth token.
    pub auth_token: Secret,
}

/// `[auth.sms.messagebird]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MessagebirdConfig {
    /// Use MessageBird for SMS.
    pub enabled: bool,
    /// Sender id.
    pub originator: String,
    /// Access key.
    pub access_key: Secret,
}

/// `[auth.sms.textlocal]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextlocalConfig {
    /// Use Textlocal for SMS.
    pub enabled: bool,
    /// Sender name.
    pub sender: String,
    /// API key.
    pub api_key: Secret,
}

/// `[auth.sms.vonage]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VonageConfig {
    /// Use Vonage for SMS.
    pub enabled: bool,
    /// Sender number.
    pub from: String,
    /// API key.
    pub api_key: String,
    /// API secret.
    pub api_secret: Secret,
}

/// `[auth.external.<provider>]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExternalProvider {
    /// Offer this OAuth provider.
    pub enabled: bool,
    /// OAuth client id.
    pub client_id: String,
    /// OAuth client secret.
    pub secret: Secret,
    /// Provider base URL, for self-hosted providers.
    pub url: String,
    /// Overrides the default callback URL.
    pub redirect_uri: String,
    /// Skip ID token nonce checks; needed for some mobile SDKs.
    pub skip_nonce_check: bool,
}

/// `[auth.web3]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Web3Config {
    /// Sign in with Solana.
    pub solana: SolanaConfig,
}

/// `[auth.web3.solana]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolanaConfig {
    /// Offer Solana sign-in.
    pub enabled: bool,
}

/// `[auth.third_party]`: external identity providers whose JWTs are trusted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThirdPartyConfig {
    /// Firebase Auth.
    pub firebase: FirebaseAuth,
    /// Auth0.
    pub auth0: Auth0Auth,
    /// AWS Cognito.
    pub aws_cognito: CognitoAuth,
    /// Clerk.
    pub clerk: ClerkAuth,
    /// WorkOS.
    pub workos: WorkosAuth,
}

/// `[auth.third_party.firebase]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FirebaseAuth {
    /// Trust Firebase tokens.
    pub enabled: bool,
    /// Firebase project id.
    pub project_id: String,
}

/// `[auth.third_party.auth0]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Auth0Auth {
    /// Trust Auth0 tokens.
    pub enabled: bool,
    /// Auth0 tenant.
    pub tenant: String,
    /// Region suffix for tenants outside the default region.
    pub tenant_region: String,
}

/// `[auth.third_party.aws_cognito]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CognitoAuth {
    /// Trust Cognito tokens.
    pub enabled: bool,
    /// Cognito user pool id.
    pub user_pool_id: String,
    /// Cognito user pool region.
    pub user_pool_region: String,
}

/// `[auth.third_party.clerk]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClerkAuth {
    /// Trust Clerk tokens.
    pub enabled: bool,
    /// Clerk frontend API domain.
    pub domain: String,
}

/// `[auth.third_party.workos]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkosAuth {
    /// Trust WorkOS tokens.
    pub enabled: bool,
    /// WorkOS issuer URL.
    pub issuer_url: String,
}

/// Issuer and key set of an enabled third-party provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThirdPartyIssuer {
    /// Config table name of the provider.
    pub provider: &'static str,
    /// Expected `iss` claim.
    pub issuer_url: String,
    /// Where the provider publishes its signing keys.
    pub jwks_url: String,
}

const FIREBASE_JWKS_URL: &str =
    "https://www.googleapis.com/service_accounts/v1/jwk/securetoken@system.gserviceaccount.com";

impl ThirdPartyConfig {
    /// Names of the enabled providers.
    pub fn enabled_providers(&self) -> Vec<&'static str> {
        [
            ("firebase", self.firebase.enabled),
            ("auth0", self.auth0.enabled),
            ("aws_cognito", self.aws_cognito.enabled),
            ("clerk", self.clerk.enabled),
            ("workos", self.workos.enabled),
        ]
        .into_iter()
        .filter_map(|(name, enabled)| enabled.then_some(name))
        .collect()
    }

    /// Issuer of the first enabled provider, if any.
    pub fn issuer(&self) -> Option<ThirdPartyIssuer> {
        let well_known = |issuer: String| {
            let jwks_url = format!("{}/.well-known/jwks.json", issuer.trim_end_matches('/'));
            (issuer, jwks_url)
        };
        let (provider, (issuer_url, jwks_url)) = if self.firebase.enabled {
            (
                "firebase",
                (
                    format!("https://securetoken.google.com/{}", self.firebase.project_id),
                    FIREBASE_JWKS_URL.to_string(),
                ),
            )
        } else if self.auth0.enabled {
            let host = if self.auth0.tenant_region.is_empty() {
                format!("{}.auth0.com", self.auth0.tenant)
            } else {
                format!("{}.{}.auth0.com", self.auth0.tenant, self.auth0.tenant_region)
            };
            ("auth0", well_known(format!("https://{host}")))
        } else if self.aws_cognito.enabled {
            (
                "aws_cognito",
                well_known(format!(
                    "https://cognito-idp.{}.amazonaws.com/{}",
                    self.aws_cognito.user_pool_region, self.aws_cognito.user_pool_id
                )),
            )
        } else if self.clerk.enabled {
            ("clerk", well_known(format!("https://{}", self.clerk.domain)))
        } else if self.workos.enabled {
            ("workos", well_known(self.workos.issuer_url.clone()))
        } else {
            return None;
        };
        Some(ThirdPartyIssuer {
            provider,
            issuer_url,
            jwks_url,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issuer_urls_per_provider() {
        let mut third_party = ThirdPartyConfig::default();
        assert_eq!(third_party.issuer(), None);

        third_party.auth0 = Auth0Auth {
            enabled: true,
            tenant: "acme".to_string(),
            tenant_region: "eu".to_string(),
        };
        let issuer = third_party.issuer().expect("auth0 enabled");
        assert_eq!(issuer.issuer_url, "https://acme.eu.auth0.com");
        assert_eq!(issuer.jwks_url, "https://acme.eu.auth0.com/.well-known/jwks.json");

        third_party.auth0.enabled = false;
        third_party.aws_cognito = CognitoAuth {
            enabled: true,
            user_pool_id: "pool".to_string(),
            user_pool_region: "us-east-1".to_string(),
        };
        let issuer = third_party.issuer().expect("cognito enabled");
        assert_eq!(
            issuer.issuer_url,
            "https://cognito-idp.us-east-1.amazonaws.com/pool"
        );

        third_party.aws_cognito.enabled = false;
        third_party.firebase = FirebaseAuth {
            enabled: true,
            project_id: "demo".to_string(),
        };
        let issuer = third_party.issuer().expect("firebase enabled");
        assert_eq!(issuer.issuer_url, "https://securetoken.google.com/demo");
        assert_eq!(issuer.jwks_url, FIREBASE_JWKS_URL);
    }

    #[test]
    fn secrets_cover_optional_blocks_only_when_present() {
        let mut auth = AuthConfig::default();
        let paths: Vec<String> = auth.secrets_mut().into_iter().map(|(path, _)| path).collect();
        assert!(!paths.iter().any(|path| path.starts_with("captcha")));
        assert!(paths.contains(&"sms.vonage.api_secret".to_string()));

        auth.captcha = Some(Captcha::default());
        auth.hook.send_sms = Some(HookEntry::default());
        auth.external
            .insert("github".to_string(), ExternalProvider::default());
        let paths: Vec<String> = auth.secrets_mut().into_iter().map(|(path, _)| path).collect();
        assert!(paths.contains(&"captcha.secret".to_string()));
        assert!(paths.contains(&"hook.send_sms.secrets".to_string()));
        assert!(paths.contains(&"external.github.secret".to_string()));
    }

    #[test]
    fn enabled_sms_providers_in_order() {
        let mut sms = SmsConfig::default();
        sms.vonage.enabled = true;
        sms.twilio.enabled = true;
        assert_eq!(
            sms.enabled_providers(),
            vec![SmsProviderKind::Twilio, SmsProviderKind::Vonage]
        );
    }
}
