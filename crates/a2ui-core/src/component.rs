//! Component definitions.
//!
//! Every component carries an `id` and a `type` tag from a closed set. Each
//! tag maps to one [`ComponentKind`] variant holding only the attributes that
//! tag understands. Attributes are read leniently: a value of the wrong shape
//! is treated as absent and falls back to the documented default, so one
//! sloppy attribute never costs the whole component.

use serde::de::{DeserializeOwned, Deserializer, Error as _};
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::data::DataValue;

/// The closed set of component type tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentType {
    Text,
    Image,
    Icon,
    Card,
    Row,
    Column,
    Button,
    TextField,
    CheckBox,
    Slider,
    MultipleChoice,
    Tabs,
    Divider,
    List,
}

impl ComponentType {
    pub const ALL: [ComponentType; 14] = [
        Self::Text,
        Self::Image,
        Self::Icon,
        Self::Card,
        Self::Row,
        Self::Column,
        Self::Button,
        Self::TextField,
        Self::CheckBox,
        Self::Slider,
        Self::MultipleChoice,
        Self::Tabs,
        Self::Divider,
        Self::List,
    ];

    pub fn tag(self) -> &'static str {
        match self {
            Self::Text => "Text",
            Self::Image => "Image",
            Self::Icon => "Icon",
            Self::Card => "Card",
            Self::Row => "Row",
            Self::Column => "Column",
            Self::Button => "Button",
            Self::TextField => "TextField",
            Self::CheckBox => "CheckBox",
            Self::Slider => "Slider",
            Self::MultipleChoice => "MultipleChoice",
            Self::Tabs => "Tabs",
            Self::Divider => "Divider",
            Self::List => "List",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.tag() == tag)
    }
}

/// One node of a surface's UI tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Component {
    pub id: String,
    pub kind: ComponentKind,
}

impl Component {
    pub fn new(id: impl Into<String>, kind: ComponentKind) -> Self {
        Self { id: id.into(), kind }
    }

    /// The tag as it appeared on the wire.
    pub fn type_tag(&self) -> &str {
        match &self.kind {
            ComponentKind::Unknown { type_tag } => type_tag,
            kind => kind.component_type().map(ComponentType::tag).unwrap_or_default(),
        }
    }

    /// Declared child ids, in order. Empty for leaf widgets.
    pub fn children(&self) -> &[String] {
        match &self.kind {
            ComponentKind::Card(p) => &p.children,
            ComponentKind::Row(p) => &p.children,
            ComponentKind::Column(p) => &p.children,
            ComponentKind::List(p) => &p.children,
            _ => &[],
        }
    }

    /// The bound path of a two-way bound widget.
    pub fn bound_path(&self) -> Option<&str> {
        match &self.kind {
            ComponentKind::TextField(p) => p.bound_path.as_deref(),
            ComponentKind::CheckBox(p) => p.bound_path.as_deref(),
            ComponentKind::Slider(p) => p.bound_path.as_deref(),
            ComponentKind::MultipleChoice(p) => p.bound_path.as_deref(),
            _ => None,
        }
    }
}

impl<'de> Deserialize<'de> for Component {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Map::<String, Value>::deserialize(deserializer)?;

        let id = match raw.get("id") {
            Some(Value::String(id)) => id.clone(),
            _ => return Err(D::Error::missing_field("id")),
        };
        let type_tag = match raw.get("type") {
            Some(Value::String(tag)) => tag.clone(),
            _ => return Err(D::Error::missing_field("type")),
        };

        if ComponentType::from_tag(&type_tag).is_none() {
            return Ok(Self {
                id,
                kind: ComponentKind::Unknown { type_tag },
            });
        }

        let kind = serde_json::from_value(Value::Object(raw)).map_err(D::Error::custom)?;
        Ok(Self { id, kind })
    }
}

/// Type-specific attributes, one variant per tag.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type")]
pub enum ComponentKind {
    Text(TextProps),
    Image(ImageProps),
    Icon(IconProps),
    Card(CardProps),
    Row(RowProps),
    Column(ColumnProps),
    Button(ButtonProps),
    TextField(TextFieldProps),
    CheckBox(CheckBoxProps),
    Slider(SliderProps),
    MultipleChoice(MultipleChoiceProps),
    Tabs(TabsProps),
    Divider(DividerProps),
    List(ListProps),
    /// A tag outside the closed set, kept for forward compatibility.
    #[serde(skip_deserializing)]
    Unknown { type_tag: String },
}

impl ComponentKind {
    pub fn component_type(&self) -> Option<ComponentType> {
        let ty = match self {
            Self::Text(_) => ComponentType::Text,
            Self::Image(_) => ComponentType::Image,
            Self::Icon(_) => ComponentType::Icon,
            Self::Card(_) => ComponentType::Card,
            Self::Row(_) => ComponentType::Row,
            Self::Column(_) => ComponentType::Column,
            Self::Button(_) => ComponentType::Button,
            Self::TextField(_) => ComponentType::TextField,
            Self::CheckBox(_) => ComponentType::CheckBox,
            Self::Slider(_) => ComponentType::Slider,
            Self::MultipleChoice(_) => ComponentType::MultipleChoice,
            Self::Tabs(_) => ComponentType::Tabs,
            Self::Divider(_) => ComponentType::Divider,
            Self::List(_) => ComponentType::List,
            Self::Unknown { .. } => return None,
        };
        Some(ty)
    }
}

fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| serde_json::from_value(v).ok()))
}

fn lenient_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    lenient(deserializer).map(Option::unwrap_or_default)
}

// --- Attribute enums ---

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UsageHint {
    H1,
    H2,
    H3,
    H4,
    H5,
    #[default]
    Body,
    Caption,
    Code,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFit {
    #[default]
    Cover,
    Contain,
    Fill,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Distribution {
    Equal,
    #[default]
    Packed,
    SpaceBetween,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    #[default]
    Start,
    Center,
    End,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ButtonVariant {
    #[default]
    Primary,
    Secondary,
    Ghost,
    Danger,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputType {
    #[default]
    Text,
    Email,
    Tel,
    Number,
    Password,
    Date,
    Time,
    Url,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChoiceMode {
    #[default]
    Single,
    Multi,
    Chip,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Horizontal,
    Vertical,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ChoiceOption {
    pub value: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TabItem {
    pub label: String,
    pub content_id: String,
}

// --- Per-type attributes ---

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextProps {
    #[serde(default, deserialize_with = "lenient")]
    pub content: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub usage_hint: Option<UsageHint>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ImageProps {
    #[serde(default, deserialize_with = "lenient")]
    pub url: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub alt: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub fit: Option<ImageFit>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct IconProps {
    #[serde(default, deserialize_with = "lenient")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CardProps {
    #[serde(default, deserialize_with = "lenient")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub children: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RowProps {
    #[serde(default, deserialize_with = "lenient")]
    pub distribution: Option<Distribution>,
    #[serde(default, deserialize_with = "lenient")]
    pub alignment: Option<Alignment>,
    #[serde(default, deserialize_with = "lenient")]
    pub gap: Option<f64>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub children: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ColumnProps {
    #[serde(default, deserialize_with = "lenient")]
    pub alignment: Option<Alignment>,
    #[serde(default, deserialize_with = "lenient")]
    pub gap: Option<f64>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub children: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ButtonProps {
    #[serde(default, deserialize_with = "lenient")]
    pub label: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub variant: Option<ButtonVariant>,
    #[serde(default, deserialize_with = "lenient")]
    pub action_name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub icon: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextFieldProps {
    #[serde(default, deserialize_with = "lenient")]
    pub label: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub placeholder: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub input_type: Option<InputType>,
    #[serde(default, deserialize_with = "lenient")]
    pub required: Option<bool>,
    #[serde(default, deserialize_with = "lenient")]
    pub bound_path: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckBoxProps {
    #[serde(default, deserialize_with = "lenient")]
    pub label: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub bound_path: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SliderProps {
    #[serde(default, deserialize_with = "lenient")]
    pub label: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub min: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub max: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub step: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub bound_path: Option<String>,
}

impl SliderProps {
    pub const DEFAULT_MIN: f64 = 0.0;
    pub const DEFAULT_MAX: f64 = 100.0;
    pub const DEFAULT_STEP: f64 = 1.0;

    pub fn min(&self) -> f64 {
        self.min.unwrap_or(Self::DEFAULT_MIN)
    }

    pub fn max(&self) -> f64 {
        self.max.unwrap_or(Self::DEFAULT_MAX)
    }

    pub fn step(&self) -> f64 {
        self.step.unwrap_or(Self::DEFAULT_STEP)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MultipleChoiceProps {
    #[serde(default, deserialize_with = "lenient")]
    pub label: Option<String>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub options: Vec<ChoiceOption>,
    #[serde(default, deserialize_with = "lenient")]
    pub mode: Option<ChoiceMode>,
    #[serde(default, deserialize_with = "lenient")]
    pub bound_path: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TabsProps {
    #[serde(default, deserialize_with = "lenient_list")]
    pub tabs: Vec<TabItem>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct DividerProps {
    #[serde(default, deserialize_with = "lenient")]
    pub direction: Option<Direction>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListProps {
    #[serde(default, deserialize_with = "lenient")]
    pub max_height: Option<f64>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub children: Vec<String>,
}

impl MultipleChoiceProps {
    /// Whether `value` is picked given the bound value `current`.
    pub fn is_selected(&self, current: Option<&DataValue>, value: &str) -> bool {
        match (self.mode.unwrap_or_default(), current) {
            (ChoiceMode::Multi, Some(DataValue::Array(items))) => {
                items.iter().any(|item| item.as_str() == Some(value))
            }
            (ChoiceMode::Multi, _) => false,
            (_, Some(current)) => current.as_str() == Some(value),
            (_, None) => false,
        }
    }
}

/// Default gap between children of a row or column.
pub const DEFAULT_GAP: f64 = 8.0;

impl RowProps {
    pub fn gap(&self) -> f64 {
        self.gap.unwrap_or(DEFAULT_GAP)
    }
}

impl ColumnProps {
    pub fn gap(&self) -> f64 {
        self.gap.unwrap_or(DEFAULT_GAP)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: serde_json::Value) -> Component {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_known_tags_round_trip_through_from_tag() {
        for ty in ComponentType::ALL {
            assert_eq!(ComponentType::from_tag(ty.tag()), Some(ty));
        }
        assert_eq!(ComponentType::from_tag("Carousel"), None);
    }

    #[test]
    fn test_text_component() {
        let c = parse(json!({"id": "t", "type": "Text", "content": "Hi", "usageHint": "h2"}));
        assert_eq!(c.id, "t");
        assert_eq!(
            c.kind,
            ComponentKind::Text(TextProps {
                content: Some("Hi".into()),
                usage_hint: Some(UsageHint::H2),
            })
        );
        assert_eq!(c.type_tag(), "Text");
    }

    #[test]
    fn test_unknown_tag_is_preserved() {
        let c = parse(json!({"id": "x", "type": "Carousel", "items": [1, 2]}));
        assert_eq!(
            c.kind,
            ComponentKind::Unknown {
                type_tag: "Carousel".into()
            }
        );
        assert_eq!(c.type_tag(), "Carousel");
        assert!(c.kind.component_type().is_none());
    }

    #[test]
    fn test_bad_attributes_fall_back_to_defaults() {
        let c = parse(json!({
            "id": "row",
            "type": "Row",
            "gap": "wide",
            "distribution": "diagonal",
            "children": ["a", "b"]
        }));
        let ComponentKind::Row(props) = &c.kind else {
            panic!("expected row, got {:?}", c.kind);
        };
        assert_eq!(props.gap(), DEFAULT_GAP);
        assert_eq!(props.distribution, None);
        assert_eq!(c.children(), ["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_bound_widgets_expose_path() {
        let c = parse(json!({
            "id": "name",
            "type": "TextField",
            "label": "Name",
            "inputType": "email",
            "required": true,
            "boundPath": "/contact/name"
        }));
        assert_eq!(c.bound_path(), Some("/contact/name"));
        let ComponentKind::TextField(props) = &c.kind else {
            panic!("expected text field");
        };
        assert_eq!(props.input_type, Some(InputType::Email));
        assert_eq!(props.required, Some(true));
    }

    #[test]
    fn test_tabs_and_choice_lists() {
        let tabs = parse(json!({
            "id": "tabs",
            "type": "Tabs",
            "tabs": [{"label": "One", "contentId": "p1"}, {"label": "Two", "contentId": "p2"}]
        }));
        let ComponentKind::Tabs(props) = &tabs.kind else {
            panic!("expected tabs");
        };
        assert_eq!(props.tabs[1].content_id, "p2");

        let choice = parse(json!({
            "id": "c",
            "type": "MultipleChoice",
            "mode": "chip",
            "options": [{"value": "a", "label": "A"}]
        }));
        let ComponentKind::MultipleChoice(props) = &choice.kind else {
            panic!("expected multiple choice");
        };
        assert_eq!(props.mode, Some(ChoiceMode::Chip));
        assert_eq!(props.options.len(), 1);
    }

    #[test]
    fn test_missing_id_is_error() {
        let err = serde_json::from_value::<Component>(json!({"type": "Text"}));
        assert!(err.is_err());
    }

    #[test]
    fn test_slider_defaults() {
        let props = SliderProps::default();
        assert_eq!(props.min(), 0.0);
        assert_eq!(props.max(), 100.0);
        assert_eq!(props.step(), 1.0);
    }

    #[test]
    fn test_choice_selection_by_mode() {
        let multi = MultipleChoiceProps {
            mode: Some(ChoiceMode::Multi),
            ..Default::default()
        };
        let picked = DataValue::from(json!(["a", "c"]));
        assert!(multi.is_selected(Some(&picked), "a"));
        assert!(!multi.is_selected(Some(&picked), "b"));
        assert!(!multi.is_selected(Some(&DataValue::from("a")), "a"));

        let chip = MultipleChoiceProps {
            mode: Some(ChoiceMode::Chip),
            ..Default::default()
        };
        assert!(chip.is_selected(Some(&DataValue::from("a")), "a"));
        assert!(!chip.is_selected(Some(&picked), "a"));
        assert!(!chip.is_selected(None, "a"));
    }
}
