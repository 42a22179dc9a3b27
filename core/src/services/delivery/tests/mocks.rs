//! Mock provider adapters for testing delivery and the OTP service

use async_trait::async_trait;
use mazad_shared::Channel;
use std::sync::Mutex;
use std::time::Duration;

use crate::domain::{CanonicalPhone, DeliveryStatus};
use crate::errors::{FailureClass, ProviderError};
use crate::services::delivery::ProviderAdapter;

#[derive(Debug, Clone)]
pub enum Behavior {
    Accept,
    Fail(FailureClass),
    /// Never answers within any reasonable timeout
    Hang,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SentMessage {
    pub phone: String,
    pub code: String,
    pub channel: Channel,
    pub sender: Option<String>,
}

pub struct ScriptedProvider {
    id: String,
    channels: Vec<Channel>,
    behavior: Mutex<Behavior>,
    pub sent: Mutex<Vec<SentMessage>>,
}

impl ScriptedProvider {
    pub fn new(id: &str, behavior: Behavior) -> Self {
        Self {
            id: id.to_string(),
            channels: vec![Channel::Sms, Channel::Whatsapp],
            behavior: Mutex::new(behavior),
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn accepting(id: &str) -> Self {
        Self::new(id, Behavior::Accept)
    }

    pub fn failing(id: &str, class: FailureClass) -> Self {
        Self::new(id, Behavior::Fail(class))
    }

    pub fn hanging(id: &str) -> Self {
        Self::new(id, Behavior::Hang)
    }

    pub fn sms_only(mut self) -> Self {
        self.channels = vec![Channel::Sms];
        self
    }

    pub fn set_behavior(&self, behavior: Behavior) {
        *self.behavior.lock().unwrap() = behavior;
    }

    pub fn calls(&self) -> usize {
        self.sent.lock().unwrap().len()
    }

    pub fn last_sent(&self) -> Option<SentMessage> {
        self.sent.lock().unwrap().last().cloned()
    }

    pub fn last_code(&self) -> Option<String> {
        self.last_sent().map(|m| m.code)
    }
}

#[async_trait]
impl ProviderAdapter for ScriptedProvider {
    fn id(&self) -> &str {
        &self.id
    }

    fn supports(&self, channel: Channel) -> bool {
        self.channels.contains(&channel)
    }

    async fn send(
        &self,
        phone: &CanonicalPhone,
        code: &str,
        channel: Channel,
        sender: Option<&str>,
    ) -> Result<String, ProviderError> {
        let behavior = self.behavior.lock().unwrap().clone();
        let call_number = {
            let mut sent = self.sent.lock().unwrap();
            sent.push(SentMessage {
                phone: phone.as_str().to_string(),
                code: code.to_string(),
                channel,
                sender: sender.map(str::to_string),
            });
            sent.len()
        };

        match behavior {
            Behavior::Accept => Ok(format!("{}-ref-{}", self.id, call_number)),
            Behavior::Fail(class) => Err(ProviderError::new(class, format!("{} refused", self.id))),
            Behavior::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(format!("{}-late", self.id))
            }
        }
    }

    async fn fetch_status(&self, provider_ref: &str) -> Result<DeliveryStatus, ProviderError> {
        if provider_ref.starts_with(&self.id) {
            Ok(DeliveryStatus::Delivered)
        } else {
            Err(ProviderError::unknown("20404", "reference not found"))
        }
    }
}
