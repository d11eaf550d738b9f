//
//  vika
//  api/datasheet/fields.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Field (column) metadata.
//!
//! Each field has a [`FieldType`] and a type-specific property object. The
//! property is decoded in two steps: the descriptor is read with the property
//! left as raw JSON, then the raw JSON is decoded into the [`FieldProperty`]
//! variant matching the type.
//!
//! | Field types | Property variant |
//! |-------------|------------------|
//! | `SingleText` | [`FieldProperty::SingleText`] |
//! | `SingleSelect`, `MultiSelect` | [`FieldProperty::Select`] |
//! | `Number` | [`FieldProperty::Number`] |
//! | `Currency` | [`FieldProperty::Currency`] |
//! | `Percent` | [`FieldProperty::Percent`] |
//! | `DateTime`, `CreatedTime`, `LastModifiedTime` | [`FieldProperty::DateTime`] |
//! | `Member` | [`FieldProperty::Member`] |
//! | `Checkbox` | [`FieldProperty::Checkbox`] |
//! | `Rating` | [`FieldProperty::Rating`] |
//! | `MagicLink` | [`FieldProperty::MagicLink`] |
//! | `MagicLookUp` | [`FieldProperty::MagicLookUp`] |
//! | `Formula` | [`FieldProperty::Formula`] |
//! | `CreatedBy`, `LastModifiedBy` | [`FieldProperty::User`] |
//! | anything else, or a shape that does not match | [`FieldProperty::Opaque`] |
//!
//! A field without a property object decodes to [`FieldProperty::None`].

use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::api::common::Result;
use crate::api::request::{require_id, ApiRequest, HttpMethod, QueryParams};

/// Column type of a field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FieldType {
    SingleText,
    Text,
    SingleSelect,
    MultiSelect,
    Number,
    Currency,
    Percent,
    DateTime,
    Attachment,
    Member,
    Checkbox,
    Rating,
    Url,
    Phone,
    Email,
    MagicLink,
    MagicLookUp,
    Formula,
    AutoNumber,
    CreatedTime,
    LastModifiedTime,
    CreatedBy,
    LastModifiedBy,
    /// A type this library does not know yet.
    Unknown(String),
}

impl FieldType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::SingleText => "SingleText",
            Self::Text => "Text",
            Self::SingleSelect => "SingleSelect",
            Self::MultiSelect => "MultiSelect",
            Self::Number => "Number",
            Self::Currency => "Currency",
            Self::Percent => "Percent",
            Self::DateTime => "DateTime",
            Self::Attachment => "Attachment",
            Self::Member => "Member",
            Self::Checkbox => "Checkbox",
            Self::Rating => "Rating",
            Self::Url => "URL",
            Self::Phone => "Phone",
            Self::Email => "Email",
            Self::MagicLink => "MagicLink",
            Self::MagicLookUp => "MagicLookUp",
            Self::Formula => "Formula",
            Self::AutoNumber => "AutoNumber",
            Self::CreatedTime => "CreatedTime",
            Self::LastModifiedTime => "LastModifiedTime",
            Self::CreatedBy => "CreatedBy",
            Self::LastModifiedBy => "LastModifiedBy",
            Self::Unknown(name) => name,
        }
    }
}

impl From<String> for FieldType {
    fn from(name: String) -> Self {
        match name.as_str() {
            "SingleText" => Self::SingleText,
            "Text" => Self::Text,
            "SingleSelect" => Self::SingleSelect,
            "MultiSelect" => Self::MultiSelect,
            "Number" => Self::Number,
            "Currency" => Self::Currency,
            "Percent" => Self::Percent,
            "DateTime" => Self::DateTime,
            "Attachment" => Self::Attachment,
            "Member" => Self::Member,
            "Checkbox" => Self::Checkbox,
            "Rating" => Self::Rating,
            "URL" => Self::Url,
            "Phone" => Self::Phone,
            "Email" => Self::Email,
            "MagicLink" => Self::MagicLink,
            "MagicLookUp" => Self::MagicLookUp,
            "Formula" => Self::Formula,
            "AutoNumber" => Self::AutoNumber,
            "CreatedTime" => Self::CreatedTime,
            "LastModifiedTime" => Self::LastModifiedTime,
            "CreatedBy" => Self::CreatedBy,
            "LastModifiedBy" => Self::LastModifiedBy,
            _ => Self::Unknown(name),
        }
    }
}

impl From<FieldType> for String {
    fn from(field_type: FieldType) -> Self {
        match field_type {
            FieldType::Unknown(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SingleTextProperty {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SelectProperty {
    #[serde(default)]
    pub options: Vec<SelectOption>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SelectOption {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<OptionColor>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OptionColor {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NumberProperty {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precision: Option<i32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrencyProperty {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precision: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PercentProperty {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precision: Option<i32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateTimeProperty {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_time: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_fill: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MemberType {
    Member,
    Team,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberProperty {
    #[serde(default)]
    pub options: Vec<MemberOption>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_multi: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub should_send_msg: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemberOption {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub member_type: Option<MemberType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CheckboxProperty {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RatingProperty {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<i32>,
}

/// Link to rows of another (or the same) datasheet.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MagicLinkProperty {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub foreign_datasheet_id: Option<String>,
    /// The paired link field in the foreign datasheet.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brother_field_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit_to_view_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit_single_record: Option<bool>,
}

/// Aggregation applied by a lookup field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RollupFunction {
    Values,
    Average,
    Count,
    Counta,
    Countall,
    Sum,
    Min,
    Max,
    And,
    Or,
    Xor,
    Concatenate,
    Arrayjoin,
    Arrayunique,
    Arraycompact,
}

/// Basic type of a computed value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValueType {
    String,
    Boolean,
    Number,
    DateTime,
    Array,
}

/// Display format of a computed value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValueFormat {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub format_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<FormatDetail>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormatDetail {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_time: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precision: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
}

/// The field a lookup reads from.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LookUpEntity {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datasheet_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<Box<FieldDescriptor>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MagicLookUpProperty {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related_link_field_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_field_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rollup_function: Option<RollupFunction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_type: Option<ValueType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_field: Option<LookUpEntity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<ValueFormat>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormulaProperty {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expression: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_type: Option<ValueType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_error: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<ValueFormat>,
}

/// Property of `CreatedBy` and `LastModifiedBy` fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserProperty {
    #[serde(default)]
    pub options: Vec<UserOption>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserOption {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

/// Type-specific settings of a field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldProperty {
    /// The field has no property object.
    None,
    SingleText(SingleTextProperty),
    Select(SelectProperty),
    Number(NumberProperty),
    Currency(CurrencyProperty),
    Percent(PercentProperty),
    DateTime(DateTimeProperty),
    Member(MemberProperty),
    Checkbox(CheckboxProperty),
    Rating(RatingProperty),
    MagicLink(MagicLinkProperty),
    MagicLookUp(MagicLookUpProperty),
    Formula(FormulaProperty),
    User(UserProperty),
    /// An unknown field type, or a property that did not match its type.
    Opaque(Value),
}

fn typed<T, F>(raw: Value, wrap: F) -> FieldProperty
where
    T: DeserializeOwned,
    F: FnOnce(T) -> FieldProperty,
{
    match serde_json::from_value::<T>(raw.clone()) {
        Ok(property) => wrap(property),
        Err(e) => {
            tracing::debug!(error = %e, "Field property kept as raw JSON");
            FieldProperty::Opaque(raw)
        }
    }
}

impl FieldProperty {
    /// Decodes a raw property object for the given field type.
    pub fn decode(field_type: &FieldType, raw: Option<Value>) -> Self {
        let raw = match raw {
            None | Some(Value::Null) => return Self::None,
            Some(raw) => raw,
        };

        match field_type {
            FieldType::SingleText => typed(raw, Self::SingleText),
            FieldType::SingleSelect | FieldType::MultiSelect => typed(raw, Self::Select),
            FieldType::Number => typed(raw, Self::Number),
            FieldType::Currency => typed(raw, Self::Currency),
            FieldType::Percent => typed(raw, Self::Percent),
            FieldType::DateTime | FieldType::CreatedTime | FieldType::LastModifiedTime => {
                typed(raw, Self::DateTime)
            }
            FieldType::Member => typed(raw, Self::Member),
            FieldType::Checkbox => typed(raw, Self::Checkbox),
            FieldType::Rating => typed(raw, Self::Rating),
            FieldType::MagicLink => typed(raw, Self::MagicLink),
            FieldType::MagicLookUp => typed(raw, Self::MagicLookUp),
            FieldType::Formula => typed(raw, Self::Formula),
            FieldType::CreatedBy | FieldType::LastModifiedBy => typed(raw, Self::User),
            _ => Self::Opaque(raw),
        }
    }

    /// Re-encodes the property as JSON. `None` encodes to nothing.
    pub fn to_value(&self) -> Option<Value> {
        let value = match self {
            Self::None => return None,
            Self::SingleText(p) => serde_json::to_value(p),
            Self::Select(p) => serde_json::to_value(p),
            Self::Number(p) => serde_json::to_value(p),
            Self::Currency(p) => serde_json::to_value(p),
            Self::Percent(p) => serde_json::to_value(p),
            Self::DateTime(p) => serde_json::to_value(p),
            Self::Member(p) => serde_json::to_value(p),
            Self::Checkbox(p) => serde_json::to_value(p),
            Self::Rating(p) => serde_json::to_value(p),
            Self::MagicLink(p) => serde_json::to_value(p),
            Self::MagicLookUp(p) => serde_json::to_value(p),
            Self::Formula(p) => serde_json::to_value(p),
            Self::User(p) => serde_json::to_value(p),
            Self::Opaque(raw) => Ok(raw.clone()),
        };
        value.ok()
    }
}

impl Default for FieldProperty {
    fn default() -> Self {
        Self::None
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawField {
    #[serde(default)]
    id: String,
    #[serde(default)]
    name: String,
    #[serde(rename = "type")]
    field_type: FieldType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    editable: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    is_primary: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    desc: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    property: Option<Value>,
}

/// Metadata of one field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawField", into = "RawField")]
pub struct FieldDescriptor {
    pub id: String,
    pub name: String,
    pub field_type: FieldType,
    pub editable: Option<bool>,
    /// Whether this is the datasheet's primary field.
    pub is_primary: Option<bool>,
    pub desc: Option<String>,
    pub property: FieldProperty,
}

impl From<RawField> for FieldDescriptor {
    fn from(raw: RawField) -> Self {
        let property = FieldProperty::decode(&raw.field_type, raw.property);
        Self {
            id: raw.id,
            name: raw.name,
            field_type: raw.field_type,
            editable: raw.editable,
            is_primary: raw.is_primary,
            desc: raw.desc,
            property,
        }
    }
}

impl From<FieldDescriptor> for RawField {
    fn from(field: FieldDescriptor) -> Self {
        Self {
            property: field.property.to_value(),
            id: field.id,
            name: field.name,
            field_type: field.field_type,
            editable: field.editable,
            is_primary: field.is_primary,
            desc: field.desc,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct FieldList {
    #[serde(default)]
    pub fields: Vec<FieldDescriptor>,
}

/// `GET /fusion/v1/datasheets/{id}/fields`
#[derive(Debug, Clone)]
pub struct DescribeFields {
    pub datasheet_id: String,
    pub view_id: Option<String>,
}

impl ApiRequest for DescribeFields {
    type Response = FieldList;

    fn method(&self) -> HttpMethod {
        HttpMethod::Get
    }

    fn path(&self) -> String {
        format!("/fusion/v1/datasheets/{}/fields", self.datasheet_id)
    }

    fn query(&self) -> QueryParams {
        let mut query = QueryParams::new();
        query.push_opt("viewId", self.view_id.as_deref());
        query
    }

    fn validate(&self) -> Result<()> {
        require_id("datasheet", &self.datasheet_id)?;
        if let Some(view_id) = &self.view_id {
            require_id("view", view_id)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn field(value: Value) -> FieldDescriptor {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_select_property() {
        let field = field(json!({
            "id": "fld1",
            "name": "Status",
            "type": "SingleSelect",
            "property": {"options": [{"id": "opt1", "name": "Done", "color": {"name": "green", "value": "#00ff00"}}]}
        }));

        assert_eq!(field.field_type, FieldType::SingleSelect);
        match field.property {
            FieldProperty::Select(select) => {
                assert_eq!(select.options.len(), 1);
                assert_eq!(select.options[0].name.as_deref(), Some("Done"));
            }
            other => panic!("expected select property, got {other:?}"),
        }
    }

    #[test]
    fn test_lookup_property_with_nested_field() {
        let field = field(json!({
            "id": "fld2",
            "name": "Owner names",
            "type": "MagicLookUp",
            "property": {
                "relatedLinkFieldId": "fldLink",
                "targetFieldId": "fldName",
                "rollupFunction": "ARRAYUNIQUE",
                "valueType": "Array",
                "entityField": {
                    "datasheetId": "dst2",
                    "field": {"id": "fldName", "name": "Name", "type": "SingleText"}
                }
            }
        }));

        match field.property {
            FieldProperty::MagicLookUp(lookup) => {
                assert_eq!(lookup.rollup_function, Some(RollupFunction::Arrayunique));
                assert_eq!(lookup.value_type, Some(ValueType::Array));
                let entity = lookup.entity_field.unwrap();
                assert_eq!(entity.field.unwrap().field_type, FieldType::SingleText);
            }
            other => panic!("expected lookup property, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_property_is_none() {
        let field = field(json!({"id": "fld3", "name": "Notes", "type": "Text"}));
        assert_eq!(field.property, FieldProperty::None);
        assert_eq!(field.field_type, FieldType::Text);
    }

    #[test]
    fn test_unknown_type_is_opaque() {
        let field = field(json!({
            "id": "fld4",
            "name": "Cascade",
            "type": "Cascader",
            "property": {"levels": 3}
        }));

        assert_eq!(field.field_type, FieldType::Unknown("Cascader".into()));
        assert_eq!(field.property, FieldProperty::Opaque(json!({"levels": 3})));
    }

    #[test]
    fn test_malformed_property_is_opaque() {
        let field = field(json!({
            "id": "fld5",
            "name": "Score",
            "type": "Rating",
            "property": {"icon": "star", "max": "five"}
        }));
        assert_eq!(
            field.property,
            FieldProperty::Opaque(json!({"icon": "star", "max": "five"}))
        );
    }

    #[test]
    fn test_descriptor_serializes_back_to_wire_shape() {
        let wire = json!({
            "id": "fld6",
            "name": "Price",
            "type": "Currency",
            "isPrimary": false,
            "property": {"precision": 2, "symbol": "$"}
        });
        let field = field(wire.clone());
        assert_eq!(serde_json::to_value(&field).unwrap(), wire);
    }

    #[test]
    fn test_field_type_names() {
        assert_eq!(FieldType::from("URL".to_string()), FieldType::Url);
        assert_eq!(FieldType::Url.to_string(), "URL");
        assert_eq!(String::from(FieldType::Unknown("X".into())), "X");
    }

    #[test]
    fn test_describe_fields_request() {
        let request = DescribeFields {
            datasheet_id: "dst1".into(),
            view_id: Some("viw1".into()),
        };
        assert_eq!(request.path(), "/fusion/v1/datasheets/dst1/fields");
        assert_eq!(request.query().encode(), "viewId=viw1");
        assert!(request.validate().is_ok());
    }
}
