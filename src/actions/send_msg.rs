use super::Action;
use crate::definition::{tagged, TemplateField};
use crate::engine::RunScope;
use crate::errors::ActionError;
use crate::events::EventKind;
use crate::ids::ActionId;
use crate::party::Msg;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Sends a message to the party
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendMsg {
    pub uuid: ActionId,
    pub text: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub quick_replies: Vec<String>,
}

impl SendMsg {
    pub const KIND: &'static str = "send_msg";
}

impl Action for SendMsg {
    fn kind(&self) -> &'static str {
        Self::KIND
    }

    fn uuid(&self) -> &ActionId {
        &self.uuid
    }

    fn execute(&self, scope: &mut RunScope<'_>) -> Result<(), ActionError> {
        let base = [self.text.clone()];
        let text = scope
            .localize(self.uuid.as_str(), "text", &base)
            .into_iter()
            .next()
            .unwrap_or_default();
        let text = scope.evaluate_text(&text);

        let attachments: Vec<String> = self
            .attachments
            .iter()
            .map(|a| scope.evaluate_text(a))
            .filter(|a| !a.is_empty())
            .collect();

        if text.trim().is_empty() && attachments.is_empty() {
            return Err(ActionError::Invalid(
                "send_msg: message text evaluated to empty".to_string(),
            ));
        }

        let quick_replies: Vec<String> = scope
            .localize(self.uuid.as_str(), "quick_replies", &self.quick_replies)
            .iter()
            .map(|qr| scope.evaluate_text(qr))
            .filter(|qr| !qr.is_empty())
            .collect();

        let mut msg = Msg::new(text);
        msg.attachments = attachments;
        msg.quick_replies = quick_replies;
        scope.log(EventKind::MsgCreated { msg });
        Ok(())
    }

    fn templates(&self) -> Vec<TemplateField> {
        let owner = self.uuid.as_str();
        let mut templates = vec![TemplateField::new(owner, "text", &self.text)];
        templates.extend(
            self.attachments
                .iter()
                .map(|a| TemplateField::new(owner, "attachments", a)),
        );
        templates.extend(
            self.quick_replies
                .iter()
                .map(|qr| TemplateField::new(owner, "quick_replies", qr)),
        );
        templates
    }

    fn to_json(&self) -> Value {
        tagged(Self::KIND, self)
    }
}
