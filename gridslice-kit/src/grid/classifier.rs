//! Widget Classifier
//!
//! Answers capability questions about a widget kind. The renderer computes the
//! capability set once per node and decides the render path from it.

use super::registry::WidgetKind;

/// Capability set of a widget kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Capabilities {
    pub is_input: bool,
    pub is_chart: bool,
    pub is_form: bool,
    /// Children come from props, never from child nodes
    pub is_no_children: bool,
    /// Choices come from an `options` prop
    pub is_use_options_data: bool,
    pub is_date_picker: bool,
    pub is_map: bool,
}

impl Capabilities {
    /// The empty capability set
    pub const NONE: Capabilities = Capabilities {
        is_input: false,
        is_chart: false,
        is_form: false,
        is_no_children: false,
        is_use_options_data: false,
        is_date_picker: false,
        is_map: false,
    };
}

/// Classify a config identifier. Case-insensitive; unknown identifiers have no capabilities.
pub fn classify(widget_kind: &str) -> Capabilities {
    WidgetKind::parse(widget_kind).capabilities()
}

impl WidgetKind {
    /// Capability set of this kind
    pub fn capabilities(&self) -> Capabilities {
        let mut caps = Capabilities::NONE;
        match self {
            WidgetKind::InputText | WidgetKind::InputNumber => {
                caps.is_input = true;
                caps.is_no_children = true;
            }
            WidgetKind::Select => {
                caps.is_input = true;
                caps.is_no_children = true;
                caps.is_use_options_data = true;
            }
            WidgetKind::DatePicker => {
                caps.is_input = true;
                caps.is_no_children = true;
                caps.is_date_picker = true;
            }
            WidgetKind::Checkbox | WidgetKind::Radio => {
                caps.is_input = true;
                caps.is_use_options_data = true;
            }
            WidgetKind::LineChart
            | WidgetKind::ColumnChart
            | WidgetKind::PieChart
            | WidgetKind::BarChart
            | WidgetKind::HistogramChart
            | WidgetKind::LiquidChart
            | WidgetKind::RadarChart
            | WidgetKind::RoseChart
            | WidgetKind::StockChart => caps.is_chart = true,
            WidgetKind::Form => caps.is_form = true,
            WidgetKind::Map => caps.is_map = true,
            WidgetKind::Image
            | WidgetKind::Table
            | WidgetKind::List
            | WidgetKind::Statistic
            | WidgetKind::Icon
            | WidgetKind::Tabs
            | WidgetKind::Menu
            | WidgetKind::Collapse
            | WidgetKind::Marker => caps.is_no_children = true,
            WidgetKind::Button
            | WidgetKind::Text
            | WidgetKind::Link
            | WidgetKind::Title
            | WidgetKind::Paragraph
            | WidgetKind::Tag
            | WidgetKind::Badge
            | WidgetKind::FormItem
            | WidgetKind::Dropdown
            | WidgetKind::Card
            | WidgetKind::Modal
            | WidgetKind::Drawer
            | WidgetKind::ListItem
            | WidgetKind::SummaryRow
            | WidgetKind::SummaryCell
            | WidgetKind::Unknown => {}
        }
        caps
    }
}

/// How a node is rendered, decided once per node per pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderPath {
    /// Inert placeholder, nothing observable
    Empty,
    /// Data resolution pending
    Loading,
    /// Form root with controlled descendants
    Form,
    /// Widget with its prop bag, child nodes ignored
    Leaf,
    /// Widget wrapped in a sized frame
    Map,
    /// Widget whose children are the rendered child nodes
    Container,
}

impl RenderPath {
    /// Apply the fixed priority order: unknown, loading, form, leaf, map, container.
    pub fn decide(kind: WidgetKind, caps: Capabilities, is_loading: bool) -> Self {
        if !kind.is_known() {
            RenderPath::Empty
        } else if is_loading {
            RenderPath::Loading
        } else if caps.is_form {
            RenderPath::Form
        } else if caps.is_no_children || caps.is_chart {
            RenderPath::Leaf
        } else if caps.is_map {
            RenderPath::Map
        } else {
            RenderPath::Container
        }
    }
}
