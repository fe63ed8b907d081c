use crate::document::{Behavior, EntityRef, FieldValue};
use serde_json::{Map, Value, json};

/// Which identity scheme reference fields carry in serialized output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Form {
    /// Session-local ids inline. Valid only for matching other in-memory
    /// entities of the same runtime session.
    Runtime,
    /// Persistent repository ids inline. Required whenever the candidate
    /// text comes from disk or another session.
    Persistent,
}

/// Canonical serialized text of a behavior instance in the requested form.
/// Pure and deterministic: field order is fixed by the JSON map ordering,
/// so identity-token renderings appear verbatim inside reference fields.
pub fn behavior_form(behavior: &Behavior, form: Form) -> String {
    behavior_value(behavior, form).to_string()
}

pub fn runtime_form(behavior: &Behavior) -> String {
    behavior_form(behavior, Form::Runtime)
}

pub fn persistent_form(behavior: &Behavior) -> String {
    behavior_form(behavior, Form::Persistent)
}

fn behavior_value(behavior: &Behavior, form: Form) -> Value {
    let mut fields = Map::new();
    for (name, value) in &behavior.fields {
        fields.insert(name.clone(), field_value(value, form));
    }
    json!({
        "type": behavior.type_name,
        "module": behavior.module,
        "fileId": behavior.file_id,
        "fields": fields,
    })
}

fn field_value(value: &FieldValue, form: Form) -> Value {
    match value {
        FieldValue::Flag(b) => json!(b),
        FieldValue::Int(n) => json!(n),
        FieldValue::Float(n) => json!(n),
        FieldValue::Text(s) => json!(s),
        FieldValue::Ref(r) => ref_value(r, form),
        FieldValue::List(items) => {
            Value::Array(items.iter().map(|item| field_value(item, form)).collect())
        }
    }
}

fn ref_value(r: &EntityRef, form: Form) -> Value {
    match form {
        // An unresolved referent renders as id 0, the null reference.
        Form::Runtime => json!({ "sessionId": r.session.unwrap_or(0) }),
        Form::Persistent => json!({ "fileId": r.file_id, "guid": r.guid }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::IdentityToken;
    use crate::model::PersistentId;
    use std::collections::BTreeMap;

    fn behavior_with_ref(r: EntityRef) -> Behavior {
        let mut fields = BTreeMap::new();
        fields.insert("strength".to_string(), FieldValue::Int(3));
        fields.insert("onDeath".to_string(), FieldValue::Ref(r));
        Behavior {
            type_name: "Spawner".to_string(),
            module: "combat".to_string(),
            file_id: 11,
            fields,
            session_id: 900,
            template: None,
        }
    }

    #[test]
    fn persistent_form_embeds_persistent_token() {
        let behavior = behavior_with_ref(EntityRef {
            file_id: 42,
            guid: "abcd".to_string(),
            session: Some(7),
        });
        let text = persistent_form(&behavior);
        let token = IdentityToken::Persistent(PersistentId::new("abcd", 42));
        assert!(text.contains(&token.render()), "form was: {text}");
        assert!(!text.contains("sessionId"));
    }

    #[test]
    fn runtime_form_embeds_session_token() {
        let behavior = behavior_with_ref(EntityRef {
            file_id: 42,
            guid: "abcd".to_string(),
            session: Some(7),
        });
        let text = runtime_form(&behavior);
        assert!(text.contains(&IdentityToken::Session(7).render()));
        assert!(!text.contains("guid"));
    }

    #[test]
    fn forms_are_deterministic() {
        let behavior = behavior_with_ref(EntityRef::to_session(5));
        assert_eq!(runtime_form(&behavior), runtime_form(&behavior));
        assert_eq!(persistent_form(&behavior), persistent_form(&behavior));
    }
}
