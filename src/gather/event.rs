use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::network::RequestId;
use crate::protocol::ProtocolMessage;

/// Protocol event carrying inspector issues.
pub const ISSUE_ADDED: &str = "Audits.issueAdded";

/// Known inspector issue buckets. Declaration order is artifact key order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum IssueCategory {
    MixedContent,
    SameSiteCookie,
    BlockedByResponse,
    HeavyAd,
    ContentSecurityPolicy,
    SharedArrayBuffer,
    LowTextContrast,
    Cors,
    AttributionReporting,
    QuirksMode,
    NavigatorUserAgent,
    Generic,
    Deprecation,
    ClientHint,
    FederatedAuthRequest,
    BounceTracking,
    StylesheetLoading,
    PropertyRule,
}

impl IssueCategory {
    pub const ALL: [IssueCategory; 18] = [
        IssueCategory::MixedContent,
        IssueCategory::SameSiteCookie,
        IssueCategory::BlockedByResponse,
        IssueCategory::HeavyAd,
        IssueCategory::ContentSecurityPolicy,
        IssueCategory::SharedArrayBuffer,
        IssueCategory::LowTextContrast,
        IssueCategory::Cors,
        IssueCategory::AttributionReporting,
        IssueCategory::QuirksMode,
        IssueCategory::NavigatorUserAgent,
        IssueCategory::Generic,
        IssueCategory::Deprecation,
        IssueCategory::ClientHint,
        IssueCategory::FederatedAuthRequest,
        IssueCategory::BounceTracking,
        IssueCategory::StylesheetLoading,
        IssueCategory::PropertyRule,
    ];

    /// Maps an `InspectorIssueCode`. Older sessions still report `SameSiteCookieIssue`.
    pub fn from_code(code: &str) -> Option<Self> {
        let category = match code {
            "MixedContentIssue" => IssueCategory::MixedContent,
            "CookieIssue" | "SameSiteCookieIssue" => IssueCategory::SameSiteCookie,
            "BlockedByResponseIssue" => IssueCategory::BlockedByResponse,
            "HeavyAdIssue" => IssueCategory::HeavyAd,
            "ContentSecurityPolicyIssue" => IssueCategory::ContentSecurityPolicy,
            "SharedArrayBufferIssue" => IssueCategory::SharedArrayBuffer,
            "LowTextContrastIssue" => IssueCategory::LowTextContrast,
            "CorsIssue" => IssueCategory::Cors,
            "AttributionReportingIssue" => IssueCategory::AttributionReporting,
            "QuirksModeIssue" => IssueCategory::QuirksMode,
            "NavigatorUserAgentIssue" => IssueCategory::NavigatorUserAgent,
            "GenericIssue" => IssueCategory::Generic,
            "DeprecationIssue" => IssueCategory::Deprecation,
            "ClientHintIssue" => IssueCategory::ClientHint,
            "FederatedAuthRequestIssue" => IssueCategory::FederatedAuthRequest,
            "BounceTrackingIssue" => IssueCategory::BounceTracking,
            "StylesheetLoadingIssue" => IssueCategory::StylesheetLoading,
            "PropertyRuleIssue" => IssueCategory::PropertyRule,
            _ => return None,
        };
        Some(category)
    }

    pub fn artifact_key(self) -> &'static str {
        match self {
            IssueCategory::MixedContent => "mixedContentIssue",
            IssueCategory::SameSiteCookie => "sameSiteCookieIssue",
            IssueCategory::BlockedByResponse => "blockedByResponseIssue",
            IssueCategory::HeavyAd => "heavyAdIssue",
            IssueCategory::ContentSecurityPolicy => "contentSecurityPolicyIssue",
            IssueCategory::SharedArrayBuffer => "sharedArrayBufferIssue",
            IssueCategory::LowTextContrast => "lowTextContrastIssue",
            IssueCategory::Cors => "corsIssue",
            IssueCategory::AttributionReporting => "attributionReportingIssue",
            IssueCategory::QuirksMode => "quirksModeIssue",
            IssueCategory::NavigatorUserAgent => "navigatorUserAgentIssue",
            IssueCategory::Generic => "genericIssue",
            IssueCategory::Deprecation => "deprecationIssue",
            IssueCategory::ClientHint => "clientHintIssue",
            IssueCategory::FederatedAuthRequest => "federatedAuthRequestIssue",
            IssueCategory::BounceTracking => "bounceTrackingIssue",
            IssueCategory::StylesheetLoading => "stylesheetLoadingIssue",
            IssueCategory::PropertyRule => "propertyRuleIssue",
        }
    }

    /// Keys of this category's payload inside `issue.details`, current name first.
    fn details_keys(self) -> &'static [&'static str] {
        match self {
            IssueCategory::MixedContent => &["mixedContentIssueDetails"],
            IssueCategory::SameSiteCookie => &["cookieIssueDetails", "sameSiteCookieIssueDetails"],
            IssueCategory::BlockedByResponse => &["blockedByResponseIssueDetails"],
            IssueCategory::HeavyAd => &["heavyAdIssueDetails"],
            IssueCategory::ContentSecurityPolicy => &["contentSecurityPolicyIssueDetails"],
            IssueCategory::SharedArrayBuffer => &["sharedArrayBufferIssueDetails"],
            IssueCategory::LowTextContrast => &["lowTextContrastIssueDetails"],
            IssueCategory::Cors => &["corsIssueDetails"],
            IssueCategory::AttributionReporting => &["attributionReportingIssueDetails"],
            IssueCategory::QuirksMode => &["quirksModeIssueDetails"],
            IssueCategory::NavigatorUserAgent => &["navigatorUserAgentIssueDetails"],
            IssueCategory::Generic => &["genericIssueDetails"],
            IssueCategory::Deprecation => &["deprecationIssueDetails"],
            IssueCategory::ClientHint => &["clientHintIssueDetails"],
            IssueCategory::FederatedAuthRequest => &["federatedAuthRequestIssueDetails"],
            IssueCategory::BounceTracking => &["bounceTrackingIssueDetails"],
            IssueCategory::StylesheetLoading => &["stylesheetLoadingIssueDetails"],
            IssueCategory::PropertyRule => &["propertyRuleIssueDetails"],
        }
    }

    /// Issues in these buckets point at a request and are only kept when the run saw it.
    pub fn anchors_to_request(self) -> bool {
        matches!(
            self,
            IssueCategory::MixedContent
                | IssueCategory::SameSiteCookie
                | IssueCategory::BlockedByResponse
        )
    }
}

/// One normalized inspector issue, immutable once received.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProtocolEvent {
    pub category: IssueCategory,
    pub payload: Value,
    pub request_ref: Option<RequestId>,
}

impl ProtocolEvent {
    /// The request reference is read from `payload.request.requestId` for anchored buckets.
    pub fn new(category: IssueCategory, payload: Value) -> Self {
        let request_ref = if category.anchors_to_request() {
            payload
                .pointer("/request/requestId")
                .and_then(Value::as_str)
                .map(RequestId::from)
        } else {
            None
        };
        Self {
            category,
            payload,
            request_ref,
        }
    }

    /// Normalizes an `Audits.issueAdded` message. Anything else, or an unknown code, is `None`.
    pub fn from_message(message: &ProtocolMessage) -> Option<Self> {
        if message.method != ISSUE_ADDED {
            return None;
        }
        let code = message.param_str("/issue/code")?;
        let Some(category) = IssueCategory::from_code(code) else {
            debug!("Ignoring unknown inspector issue code {}", code);
            return None;
        };

        let details = message.params.pointer("/issue/details");
        let payload = category
            .details_keys()
            .iter()
            .find_map(|key| details.and_then(|d| d.get(*key)))
            .cloned()
            .unwrap_or_else(|| Value::Object(Default::default()));

        Some(Self::new(category, payload))
    }
}
