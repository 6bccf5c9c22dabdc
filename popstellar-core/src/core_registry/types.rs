//! Protocol vocabulary of message data

use super::RegistryError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// `object` field of a message data payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectType {
    Lao,
    Message,
    Meeting,
    RollCall,
    Election,
    Chirp,
    Reaction,
    Coin,
    Consensus,
    Popcha,
}

impl ObjectType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectType::Lao => "lao",
            ObjectType::Message => "message",
            ObjectType::Meeting => "meeting",
            ObjectType::RollCall => "roll_call",
            ObjectType::Election => "election",
            ObjectType::Chirp => "chirp",
            ObjectType::Reaction => "reaction",
            ObjectType::Coin => "coin",
            ObjectType::Consensus => "consensus",
            ObjectType::Popcha => "popcha",
        }
    }
}

impl FromStr for ObjectType {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "lao" => Ok(ObjectType::Lao),
            "message" => Ok(ObjectType::Message),
            "meeting" => Ok(ObjectType::Meeting),
            "roll_call" => Ok(ObjectType::RollCall),
            "election" => Ok(ObjectType::Election),
            "chirp" => Ok(ObjectType::Chirp),
            "reaction" => Ok(ObjectType::Reaction),
            "coin" => Ok(ObjectType::Coin),
            "consensus" => Ok(ObjectType::Consensus),
            "popcha" => Ok(ObjectType::Popcha),
            other => Err(RegistryError::InvalidPayload(format!(
                "unknown object {:?}",
                other
            ))),
        }
    }
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `action` field of a message data payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    Create,
    UpdateProperties,
    State,
    Greet,
    Witness,
    Open,
    Reopen,
    Close,
    Setup,
    Key,
    CastVote,
    End,
    Result,
    Add,
    Delete,
    NotifyAdd,
    NotifyDelete,
    PostTransaction,
    Elect,
    ElectAccept,
    Prepare,
    Promise,
    Propose,
    Accept,
    Learn,
    Failure,
    Authenticate,
}

impl ActionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionType::Create => "create",
            ActionType::UpdateProperties => "update_properties",
            ActionType::State => "state",
            ActionType::Greet => "greet",
            ActionType::Witness => "witness",
            ActionType::Open => "open",
            ActionType::Reopen => "reopen",
            ActionType::Close => "close",
            ActionType::Setup => "setup",
            ActionType::Key => "key",
            ActionType::CastVote => "cast_vote",
            ActionType::End => "end",
            ActionType::Result => "result",
            ActionType::Add => "add",
            ActionType::Delete => "delete",
            ActionType::NotifyAdd => "notify_add",
            ActionType::NotifyDelete => "notify_delete",
            ActionType::PostTransaction => "post_transaction",
            ActionType::Elect => "elect",
            ActionType::ElectAccept => "elect_accept",
            ActionType::Prepare => "prepare",
            ActionType::Promise => "promise",
            ActionType::Propose => "propose",
            ActionType::Accept => "accept",
            ActionType::Learn => "learn",
            ActionType::Failure => "failure",
            ActionType::Authenticate => "authenticate",
        }
    }
}

impl FromStr for ActionType {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let action = match s {
            "create" => ActionType::Create,
            "update_properties" => ActionType::UpdateProperties,
            "state" => ActionType::State,
            "greet" => ActionType::Greet,
            "witness" => ActionType::Witness,
            "open" => ActionType::Open,
            "reopen" => ActionType::Reopen,
            "close" => ActionType::Close,
            "setup" => ActionType::Setup,
            "key" => ActionType::Key,
            "cast_vote" => ActionType::CastVote,
            "end" => ActionType::End,
            "result" => ActionType::Result,
            "add" => ActionType::Add,
            "delete" => ActionType::Delete,
            "notify_add" => ActionType::NotifyAdd,
            "notify_delete" => ActionType::NotifyDelete,
            "post_transaction" => ActionType::PostTransaction,
            "elect" => ActionType::Elect,
            "elect_accept" => ActionType::ElectAccept,
            "prepare" => ActionType::Prepare,
            "promise" => ActionType::Promise,
            "propose" => ActionType::Propose,
            "accept" => ActionType::Accept,
            "learn" => ActionType::Learn,
            "failure" => ActionType::Failure,
            "authenticate" => ActionType::Authenticate,
            other => {
                return Err(RegistryError::InvalidPayload(format!(
                    "unknown action {:?}",
                    other
                )))
            }
        };
        Ok(action)
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which identity must sign a given kind of message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignerClass {
    /// The long-lived key of the user
    MainIdentity,
    /// The PoP token derived for the roll call the message belongs to
    EventToken,
}
