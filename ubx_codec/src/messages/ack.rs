use crate::{
    field::{Field, FieldDef},
    message::MessageKind,
    msg_id::MsgId,
};

const ACK_FIELDS: &[FieldDef] = &[FieldDef::new("id", Field::msg_id())];

/// Acknowledges the message identified by `id`
pub static ACK_ACK: MessageKind = MessageKind::new("ACK-ACK", MsgId::ACK_ACK, ACK_FIELDS);

/// Rejects the message identified by `id`
pub static ACK_NAK: MessageKind = MessageKind::new("ACK-NAK", MsgId::ACK_NAK, ACK_FIELDS);
