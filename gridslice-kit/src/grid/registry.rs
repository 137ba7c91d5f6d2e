//! Widget Registry
//!
//! Maps widget kinds to the toolkit widgets that render them.

use std::collections::HashMap;

/// Toolkit widget used for kinds without a registered mapping.
pub const GENERIC_CONTAINER: &str = "div";

/// Widget kind identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WidgetKind {
    // Display
    Button,
    Text,
    Link,
    Title,
    Paragraph,
    Image,
    Tag,
    Badge,
    Icon,
    Statistic,

    // Collections
    List,
    Table,
    Collapse,
    Tabs,

    // Inputs
    InputText,
    InputNumber,
    Checkbox,
    Radio,
    Select,
    DatePicker,

    // Forms
    Form,
    FormItem,

    // Containers and overlays
    Dropdown,
    Card,
    Menu,
    Modal,
    Drawer,

    // Charts
    LineChart,
    ColumnChart,
    PieChart,
    BarChart,
    HistogramChart,
    LiquidChart,
    RadarChart,
    RoseChart,
    StockChart,

    Map,

    // Synthesized by the prop resolver; never parsed from config.
    ListItem,
    SummaryRow,
    SummaryCell,
    Marker,

    /// Empty or unrecognized identifier
    Unknown,
}

impl WidgetKind {
    /// Get the lowercase identifier of this kind
    pub fn name(&self) -> &'static str {
        match self {
            WidgetKind::Button => "button",
            WidgetKind::Text => "text",
            WidgetKind::Link => "link",
            WidgetKind::Title => "title",
            WidgetKind::Paragraph => "paragraph",
            WidgetKind::Image => "image",
            WidgetKind::Tag => "tag",
            WidgetKind::Badge => "badge",
            WidgetKind::Icon => "icon",
            WidgetKind::Statistic => "statistic",
            WidgetKind::List => "list",
            WidgetKind::Table => "table",
            WidgetKind::Collapse => "collapse",
            WidgetKind::Tabs => "tabs",
            WidgetKind::InputText => "inputtext",
            WidgetKind::InputNumber => "inputnumber",
            WidgetKind::Checkbox => "checkbox",
            WidgetKind::Radio => "radio",
            WidgetKind::Select => "select",
            WidgetKind::DatePicker => "datepicker",
            WidgetKind::Form => "form",
            WidgetKind::FormItem => "formitem",
            WidgetKind::Dropdown => "dropdown",
            WidgetKind::Card => "card",
            WidgetKind::Menu => "menu",
            WidgetKind::Modal => "modal",
            WidgetKind::Drawer => "drawer",
            WidgetKind::LineChart => "linechart",
            WidgetKind::ColumnChart => "columnchart",
            WidgetKind::PieChart => "piechart",
            WidgetKind::BarChart => "barchart",
            WidgetKind::HistogramChart => "histogramchart",
            WidgetKind::LiquidChart => "liquidchart",
            WidgetKind::RadarChart => "radarchart",
            WidgetKind::RoseChart => "rosechart",
            WidgetKind::StockChart => "stockchart",
            WidgetKind::Map => "map",
            WidgetKind::ListItem => "listitem",
            WidgetKind::SummaryRow => "summaryrow",
            WidgetKind::SummaryCell => "summarycell",
            WidgetKind::Marker => "marker",
            WidgetKind::Unknown => "",
        }
    }

    /// Parse a config identifier, case-insensitively.
    ///
    /// Never fails: empty and unrecognized identifiers become [`WidgetKind::Unknown`].
    pub fn parse(s: &str) -> Self {
        let lowered = s.trim().to_ascii_lowercase();
        Self::all()
            .iter()
            .copied()
            .find(|kind| kind.name() == lowered)
            .unwrap_or(WidgetKind::Unknown)
    }

    /// Check if this kind resolved to a catalog entry
    pub fn is_known(&self) -> bool {
        *self != WidgetKind::Unknown
    }

    /// Get all kinds that can appear in config
    pub fn all() -> &'static [WidgetKind] {
        &[
            WidgetKind::Button,
            WidgetKind::Text,
            WidgetKind::Link,
            WidgetKind::Title,
            WidgetKind::Paragraph,
            WidgetKind::Image,
            WidgetKind::Tag,
            WidgetKind::Badge,
            WidgetKind::Icon,
            WidgetKind::Statistic,
            WidgetKind::List,
            WidgetKind::Table,
            WidgetKind::Collapse,
            WidgetKind::Tabs,
            WidgetKind::InputText,
            WidgetKind::InputNumber,
            WidgetKind::Checkbox,
            WidgetKind::Radio,
            WidgetKind::Select,
            WidgetKind::DatePicker,
            WidgetKind::Form,
            WidgetKind::FormItem,
            WidgetKind::Dropdown,
            WidgetKind::Card,
            WidgetKind::Menu,
            WidgetKind::Modal,
            WidgetKind::Drawer,
            WidgetKind::LineChart,
            WidgetKind::ColumnChart,
            WidgetKind::PieChart,
            WidgetKind::BarChart,
            WidgetKind::HistogramChart,
            WidgetKind::LiquidChart,
            WidgetKind::RadarChart,
            WidgetKind::RoseChart,
            WidgetKind::StockChart,
            WidgetKind::Map,
        ]
    }
}

/// Mapping information for a widget kind
#[derive(Debug, Clone)]
pub struct WidgetMapping {
    /// The widget kind
    pub kind: WidgetKind,

    /// The toolkit widget that renders it
    pub widget: &'static str,
}

/// Registry for widget kind to toolkit widget mappings.
///
/// # Example
///
/// ```rust,ignore
/// let registry = WidgetRegistry::with_standard_catalog();
/// assert_eq!(registry.lookup(WidgetKind::Table), "Table");
/// assert_eq!(registry.lookup(WidgetKind::Unknown), GENERIC_CONTAINER);
/// ```
#[derive(Debug, Clone)]
pub struct WidgetRegistry {
    mappings: HashMap<WidgetKind, WidgetMapping>,
}

impl Default for WidgetRegistry {
    fn default() -> Self {
        Self::with_standard_catalog()
    }
}

impl WidgetRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        WidgetRegistry {
            mappings: HashMap::new(),
        }
    }

    /// Create a registry with the standard catalog mappings
    pub fn with_standard_catalog() -> Self {
        let mut registry = Self::new();

        let catalog: &[(WidgetKind, &'static str)] = &[
            (WidgetKind::Button, "Button"),
            (WidgetKind::Text, "Typography.Text"),
            (WidgetKind::Link, "Typography.Link"),
            (WidgetKind::Title, "Typography.Title"),
            (WidgetKind::Paragraph, "Typography.Paragraph"),
            (WidgetKind::Image, "Image"),
            (WidgetKind::Tag, "Tag"),
            (WidgetKind::Badge, "Badge"),
            (WidgetKind::Icon, "Icon"),
            (WidgetKind::Statistic, "Statistic"),
            (WidgetKind::List, "List"),
            (WidgetKind::Table, "Table"),
            (WidgetKind::Collapse, "Collapse"),
            (WidgetKind::Tabs, "Tabs"),
            (WidgetKind::InputText, "Input"),
            (WidgetKind::InputNumber, "InputNumber"),
            (WidgetKind::Checkbox, "Checkbox"),
            (WidgetKind::Radio, "Radio"),
            (WidgetKind::Select, "Select"),
            (WidgetKind::DatePicker, "DatePicker"),
            (WidgetKind::Form, "Form"),
            (WidgetKind::FormItem, "Form.Item"),
            (WidgetKind::Dropdown, "Dropdown"),
            (WidgetKind::Card, "Card"),
            (WidgetKind::Menu, "ConfigMenu"),
            (WidgetKind::Modal, "Modal"),
            (WidgetKind::Drawer, "Drawer"),
            (WidgetKind::LineChart, "Line"),
            (WidgetKind::ColumnChart, "Column"),
            (WidgetKind::PieChart, "Pie"),
            (WidgetKind::BarChart, "Bar"),
            (WidgetKind::HistogramChart, "Histogram"),
            (WidgetKind::LiquidChart, "Liquid"),
            (WidgetKind::RadarChart, "Radar"),
            (WidgetKind::RoseChart, "Rose"),
            (WidgetKind::StockChart, "Stock"),
            (WidgetKind::Map, "GoogleMap"),
            (WidgetKind::ListItem, "List.Item"),
            (WidgetKind::SummaryRow, "Table.Summary.Row"),
            (WidgetKind::SummaryCell, "Table.Summary.Cell"),
            (WidgetKind::Marker, "Marker"),
        ];

        for &(kind, widget) in catalog {
            registry.register(WidgetMapping { kind, widget });
        }

        registry
    }

    /// Register a widget mapping
    pub fn register(&mut self, mapping: WidgetMapping) {
        self.mappings.insert(mapping.kind, mapping);
    }

    /// Get a widget mapping
    pub fn get(&self, kind: WidgetKind) -> Option<&WidgetMapping> {
        self.mappings.get(&kind)
    }

    /// Get a widget mapping by config identifier
    pub fn get_by_name(&self, name: &str) -> Option<&WidgetMapping> {
        self.get(WidgetKind::parse(name))
    }

    /// Check if a widget kind is registered
    pub fn contains(&self, kind: WidgetKind) -> bool {
        self.mappings.contains_key(&kind)
    }

    /// Get the toolkit widget for a kind, falling back to the generic container
    pub fn lookup(&self, kind: WidgetKind) -> &'static str {
        self.get(kind).map(|m| m.widget).unwrap_or(GENERIC_CONTAINER)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_catalog() {
        let registry = WidgetRegistry::with_standard_catalog();

        for kind in WidgetKind::all() {
            assert!(registry.contains(*kind), "Missing mapping for {:?}", kind);
        }
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!(WidgetKind::parse("Table"), WidgetKind::Table);
        assert_eq!(WidgetKind::parse("DATEPICKER"), WidgetKind::DatePicker);
        assert_eq!(WidgetKind::parse(" inputText "), WidgetKind::InputText);
    }

    #[test]
    fn test_parse_unknown() {
        assert_eq!(WidgetKind::parse(""), WidgetKind::Unknown);
        assert_eq!(WidgetKind::parse("spaceship"), WidgetKind::Unknown);
        // Synthesized kinds are not reachable from config.
        assert_eq!(WidgetKind::parse("marker"), WidgetKind::Unknown);
        assert_eq!(WidgetKind::parse("listitem"), WidgetKind::Unknown);
    }

    #[test]
    fn test_name_round_trips_for_catalog() {
        for kind in WidgetKind::all() {
            assert_eq!(WidgetKind::parse(kind.name()), *kind);
        }
    }

    #[test]
    fn test_lookup_fallback() {
        let registry = WidgetRegistry::with_standard_catalog();
        assert_eq!(registry.lookup(WidgetKind::Form), "Form");
        assert_eq!(registry.lookup(WidgetKind::Unknown), GENERIC_CONTAINER);
        assert_eq!(WidgetRegistry::new().lookup(WidgetKind::Button), GENERIC_CONTAINER);
    }

    #[test]
    fn test_get_by_name() {
        let registry = WidgetRegistry::with_standard_catalog();
        let mapping = registry.get_by_name("PieChart").unwrap();
        assert_eq!(mapping.kind, WidgetKind::PieChart);
        assert_eq!(mapping.widget, "Pie");
    }
}
