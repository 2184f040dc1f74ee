//! Interactive widgets.
//!
//! Bound widgets read their value with `get` and write edits back with
//! `set`; that write is the only way an interactive widget changes the data
//! model. A widget without a bound path shows its default and ignores edits.

use a2ui_core::component::{
    ButtonProps, CheckBoxProps, ChoiceMode, MultipleChoiceProps, SliderProps, TextFieldProps,
};
use a2ui_core::data::DataValue;
use tracing::debug;

use crate::node::{ChoiceView, RenderNode, WidgetNode};
use crate::widget::{Capabilities, UserInput, Widget};

impl Widget for ButtonProps {
    fn render(&self, _id: &str, _cx: &mut dyn Capabilities) -> (WidgetNode, Vec<RenderNode>) {
        let node = WidgetNode::Button {
            label: self.label.clone().unwrap_or_default(),
            variant: self.variant.unwrap_or_default(),
            icon: self.icon.clone(),
            action_name: self.action_name.clone(),
        };
        (node, Vec::new())
    }

    fn on_input(&self, id: &str, input: &UserInput, cx: &mut dyn Capabilities) {
        match (input, self.action_name.as_deref()) {
            (UserInput::Activate, Some(action)) if !action.is_empty() => cx.dispatch(action),
            (UserInput::Activate, _) => debug!(component_id = id, "Button has no action"),
            (other, _) => debug!(component_id = id, ?other, "Button ignored input"),
        }
    }
}

impl Widget for TextFieldProps {
    fn render(&self, _id: &str, cx: &mut dyn Capabilities) -> (WidgetNode, Vec<RenderNode>) {
        let value = match self.bound_path.as_deref().and_then(|p| cx.get(p)) {
            None | Some(DataValue::Null) => String::new(),
            Some(other) => other.to_string(),
        };
        let node = WidgetNode::TextField {
            label: self.label.clone(),
            placeholder: self.placeholder.clone().unwrap_or_default(),
            input_type: self.input_type.unwrap_or_default(),
            required: self.required.unwrap_or(false),
            value,
        };
        (node, Vec::new())
    }

    fn on_input(&self, id: &str, input: &UserInput, cx: &mut dyn Capabilities) {
        match (input, self.bound_path.as_deref()) {
            (UserInput::Text(text), Some(path)) => cx.set(path, DataValue::from(text.as_str())),
            (other, path) => debug!(component_id = id, ?other, ?path, "TextField ignored input"),
        }
    }
}

impl Widget for CheckBoxProps {
    fn render(&self, _id: &str, cx: &mut dyn Capabilities) -> (WidgetNode, Vec<RenderNode>) {
        let checked = self
            .bound_path
            .as_deref()
            .and_then(|p| cx.get(p))
            .is_some_and(|v| v.is_truthy());
        let node = WidgetNode::CheckBox {
            label: self.label.clone(),
            checked,
        };
        (node, Vec::new())
    }

    fn on_input(&self, id: &str, input: &UserInput, cx: &mut dyn Capabilities) {
        match (input, self.bound_path.as_deref()) {
            (UserInput::Toggle(checked), Some(path)) => cx.set(path, DataValue::from(*checked)),
            (other, path) => debug!(component_id = id, ?other, ?path, "CheckBox ignored input"),
        }
    }
}

impl Widget for SliderProps {
    fn render(&self, _id: &str, cx: &mut dyn Capabilities) -> (WidgetNode, Vec<RenderNode>) {
        let value = self
            .bound_path
            .as_deref()
            .and_then(|p| cx.get(p))
            .and_then(|v| v.as_f64())
            .unwrap_or_else(|| self.min());
        let node = WidgetNode::Slider {
            label: self.label.clone(),
            min: self.min(),
            max: self.max(),
            step: self.step(),
            value,
        };
        (node, Vec::new())
    }

    /// Positions outside `[min, max]` are clamped, as a slider track would.
    fn on_input(&self, id: &str, input: &UserInput, cx: &mut dyn Capabilities) {
        match (input, self.bound_path.as_deref()) {
            (UserInput::Number(n), Some(path)) if n.is_finite() => {
                let (lo, hi) = (self.min(), self.max());
                let value = if lo <= hi { n.clamp(lo, hi) } else { *n };
                cx.set(path, DataValue::from(value));
            }
            (other, path) => debug!(component_id = id, ?other, ?path, "Slider ignored input"),
        }
    }
}

/// `single` and `chip` store the picked value; `multi` toggles membership
/// in an array, keeping first-selection order.
impl Widget for MultipleChoiceProps {
    fn render(&self, _id: &str, cx: &mut dyn Capabilities) -> (WidgetNode, Vec<RenderNode>) {
        let current = self.bound_path.as_deref().and_then(|p| cx.get(p));
        let options = self
            .options
            .iter()
            .map(|opt| ChoiceView {
                value: opt.value.clone(),
                label: opt.label.clone(),
                selected: self.is_selected(current.as_ref(), &opt.value),
            })
            .collect();
        let node = WidgetNode::MultipleChoice {
            label: self.label.clone(),
            mode: self.mode.unwrap_or_default(),
            options,
        };
        (node, Vec::new())
    }

    fn on_input(&self, id: &str, input: &UserInput, cx: &mut dyn Capabilities) {
        let (UserInput::Select(value), Some(path)) = (input, self.bound_path.as_deref()) else {
            debug!(component_id = id, ?input, "MultipleChoice ignored input");
            return;
        };

        match self.mode.unwrap_or_default() {
            ChoiceMode::Multi => {
                let mut selected: Vec<DataValue> = cx
                    .get(path)
                    .and_then(|v| v.as_array().map(<[DataValue]>::to_vec))
                    .unwrap_or_default();
                match selected.iter().position(|v| v.as_str() == Some(value.as_str())) {
                    Some(index) => {
                        selected.remove(index);
                    }
                    None => selected.push(DataValue::from(value.as_str())),
                }
                cx.set(path, DataValue::from(selected));
            }
            ChoiceMode::Single | ChoiceMode::Chip => cx.set(path, DataValue::from(value.as_str())),
        }
    }
}
