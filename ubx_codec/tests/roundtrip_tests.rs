//! Every kind of the standard catalog, filled with random legal values, has to
//! survive encode, frame and decode unchanged.
//!
//! Values are drawn from a proptest generated entropy pool by walking the
//! field descriptors, so new kinds are covered without touching this file.

use proptest::prelude::*;
use ubx_codec::{
    decode_frame,
    field::{BitMemberKind, Field, FieldDef, ListCount, ListField, ValidValues},
    messages::ALL,
    Dispatcher, Message, MsgClass, Packet, Parser, Value,
};

/// Upper bound on generated list lengths, keeping frames well below the
/// parser's payload limit
const MAX_ITEMS: usize = 3;

/// Deterministic source of numbers over a byte pool
struct Entropy<'a> {
    pool: &'a [u8],
    pos: usize,
}

impl Entropy<'_> {
    fn next_u64(&mut self) -> u64 {
        let mut raw = [0u8; 8];
        for byte in raw.iter_mut() {
            *byte = self.pool[self.pos % self.pool.len()];
            self.pos += 1;
        }
        u64::from_le_bytes(raw)
    }

    /// Inclusive range
    fn in_range(&mut self, min: i64, max: i64) -> i64 {
        let span = (max - min) as u64 + 1;
        min + (self.next_u64() % span) as i64
    }

    fn below(&mut self, n: usize) -> usize {
        (self.next_u64() % n as u64) as usize
    }

    fn pick(&mut self, values: ValidValues) -> i64 {
        match values {
            ValidValues::Range { min, max } => self.in_range(min, max),
            ValidValues::Set(set) => set[self.below(set.len())],
        }
    }
}

fn gen_items(list: &ListField, count: usize, e: &mut Entropy) -> Value {
    Value::List((0..count).map(|_| gen_field(list.elem(), &[], e)).collect())
}

fn gen_field(field: &Field, siblings: &[Value], e: &mut Entropy) -> Value {
    match field {
        Field::Int(f) => {
            let (min, max) = f.range().unwrap_or((f.repr().min(), f.repr().max()));
            Value::Int(e.in_range(min, max))
        },
        Field::Enum(f) => Value::Int(e.pick(f.values())),
        Field::Bitmask(f) => {
            let raw = e.in_range(0, f.repr().max()) as u64;
            Value::Int((raw & !f.reserved()) as i64)
        },
        Field::MsgId(_) => {
            let class = MsgClass::ALL[e.below(MsgClass::ALL.len())];
            let ids = class.ids();
            Value::Int(i64::from(ids[e.below(ids.len())]))
        },
        Field::Bitfield(f) => Value::Bits(
            f.members()
                .iter()
                .map(|member| match member.kind {
                    BitMemberKind::Uint => e.next_u64() & ((1u64 << member.bits) - 1),
                    BitMemberKind::Enum(values) => e.pick(values) as u64,
                    BitMemberKind::Reserved => 0,
                })
                .collect(),
        ),
        Field::List(f) => {
            let count = match f.count() {
                ListCount::Fixed(n) => n,
                _ => e.below(MAX_ITEMS + 1),
            };
            gen_items(f, count, e)
        },
        Field::Bundle(members) => Value::Bundle(gen_sequence(members, e)),
        Field::Optional(f) => {
            if f.is_present(siblings) {
                gen_field(f.inner(), siblings, e)
            } else {
                Value::Absent
            }
        },
    }
}

fn gen_sequence(fields: &[FieldDef], e: &mut Entropy) -> Vec<Value> {
    let mut values = Vec::with_capacity(fields.len());
    for def in fields {
        // a counted list rewrites its count so both stay consistent
        if let Field::List(list) = &def.field {
            if let ListCount::FromField(idx) = list.count() {
                let count = e.below(MAX_ITEMS + 1);
                values[idx] = Value::Int(count as i64);
                values.push(gen_items(list, count, e));
                continue;
            }
        }
        let value = gen_field(&def.field, &values, e);
        values.push(value);
    }
    values
}

/// A proptest strategy generating a legal message of any catalog kind
fn message_strategy() -> impl Strategy<Value = Message> {
    (0..ALL.len(), prop::collection::vec(any::<u8>(), 64..256)).prop_map(|(idx, pool)| {
        let kind = ALL[idx];
        let mut entropy = Entropy { pool: &pool, pos: 0 };
        let values = gen_sequence(kind.fields(), &mut entropy);
        let mut msg = Message::from_values(kind, values).unwrap();
        msg.refresh();
        msg
    })
}

proptest! {
    #[test]
    fn test_catalog_round_trip(msg in message_strategy()) {
        prop_assert!(msg.valid(), "{} invalid at {:?}", msg.name(), msg.first_invalid_field());
        prop_assert!(!msg.clone().refresh(), "refresh of {} is not idempotent", msg.name());

        let bytes = msg.to_frame_bytes().unwrap();
        prop_assert_eq!(bytes.len(), msg.payload_len() + 8);

        let (packet, used) = decode_frame(&bytes, &Dispatcher::standard()).unwrap();
        prop_assert_eq!(used, bytes.len());
        prop_assert_eq!(packet, Packet::Known(msg));
    }

    #[test]
    fn test_parser_any_chunking(
        msgs in prop::collection::vec(message_strategy(), 1..6),
        chunk_size in 1usize..64,
    ) {
        let mut stream = Vec::new();
        for msg in &msgs {
            stream.extend_from_slice(&msg.to_frame_bytes().unwrap());
        }

        let mut parser = Parser::default();
        let mut decoded = Vec::new();
        for chunk in stream.chunks(chunk_size) {
            let mut it = parser.consume(chunk);
            while let Some(pack) = it.next() {
                decoded.push(pack.unwrap());
            }
        }

        prop_assert!(parser.is_buffer_empty());
        let expected: Vec<Packet> = msgs.into_iter().map(Packet::Known).collect();
        prop_assert_eq!(decoded, expected);
    }
}
