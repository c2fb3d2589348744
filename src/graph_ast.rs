use std::collections::HashSet;

use crate::error::RenderingError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    TopBottom,
    BottomTop,
    LeftRight,
    RightLeft,
}

impl Direction {
    pub fn as_dot(self) -> &'static str {
        match self {
            Direction::TopBottom => "TB",
            Direction::BottomTop => "BT",
            Direction::LeftRight => "LR",
            Direction::RightLeft => "RL",
        }
    }

    pub fn from_dot(value: &str) -> Option<Self> {
        match value {
            "TB" => Some(Direction::TopBottom),
            "BT" => Some(Direction::BottomTop),
            "LR" => Some(Direction::LeftRight),
            "RL" => Some(Direction::RightLeft),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LabelLoc {
    #[default]
    Top,
    Bottom,
}

impl LabelLoc {
    pub fn as_dot(self) -> &'static str {
        match self {
            LabelLoc::Top => "t",
            LabelLoc::Bottom => "b",
        }
    }

    pub fn from_dot(value: &str) -> Option<Self> {
        match value {
            "t" => Some(LabelLoc::Top),
            "b" => Some(LabelLoc::Bottom),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeShape {
    Box,
    Ellipse,
    House,
    Mdiamond,
    Component,
    Cylinder,
    Note,
    Folder,
    Plaintext,
}

impl NodeShape {
    pub fn as_dot(self) -> &'static str {
        match self {
            NodeShape::Box => "box",
            NodeShape::Ellipse => "ellipse",
            NodeShape::House => "house",
            NodeShape::Mdiamond => "Mdiamond",
            NodeShape::Component => "component",
            NodeShape::Cylinder => "cylinder",
            NodeShape::Note => "note",
            NodeShape::Folder => "folder",
            NodeShape::Plaintext => "plaintext",
        }
    }

    pub fn from_dot(value: &str) -> Option<Self> {
        match value {
            "box" | "rect" | "rectangle" => Some(NodeShape::Box),
            "ellipse" | "oval" => Some(NodeShape::Ellipse),
            "house" => Some(NodeShape::House),
            "Mdiamond" => Some(NodeShape::Mdiamond),
            "component" => Some(NodeShape::Component),
            "cylinder" => Some(NodeShape::Cylinder),
            "note" => Some(NodeShape::Note),
            "folder" => Some(NodeShape::Folder),
            "plaintext" => Some(NodeShape::Plaintext),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StyleFlag {
    Filled,
    Rounded,
    Dashed,
    Dotted,
    Bold,
}

impl StyleFlag {
    pub fn as_dot(self) -> &'static str {
        match self {
            StyleFlag::Filled => "filled",
            StyleFlag::Rounded => "rounded",
            StyleFlag::Dashed => "dashed",
            StyleFlag::Dotted => "dotted",
            StyleFlag::Bold => "bold",
        }
    }

    /// Parses a comma-separated DOT style list such as `"rounded,filled"`.
    pub fn parse_list(value: &str) -> Option<Vec<StyleFlag>> {
        value
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| match s {
                "filled" => Some(StyleFlag::Filled),
                "rounded" => Some(StyleFlag::Rounded),
                "dashed" => Some(StyleFlag::Dashed),
                "dotted" => Some(StyleFlag::Dotted),
                "bold" => Some(StyleFlag::Bold),
                _ => None,
            })
            .collect()
    }

    pub fn join(flags: &[StyleFlag]) -> String {
        flags
            .iter()
            .map(|f| f.as_dot())
            .collect::<Vec<_>>()
            .join(",")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Font {
    pub family: String,
    pub title_size: u32,
}

impl Default for Font {
    fn default() -> Self {
        Self {
            family: "Helvetica".to_string(),
            title_size: 14,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Graph {
    pub name: String,
    pub comment: Option<String>,
    pub direction: Direction,
    pub title: Option<String>,
    pub title_loc: LabelLoc,
    pub font: Font,
    pub default_shape: Option<NodeShape>,
    pub default_style: Vec<StyleFlag>,
    pub clusters: Vec<Cluster>,
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Cluster {
    pub id: String,
    pub label: String,
    pub style: Vec<StyleFlag>,
    pub color: Option<String>,
    pub nodes: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: String,
    pub label: String,
    pub shape: Option<NodeShape>,
    pub fill_color: Option<String>,
    pub style: Vec<StyleFlag>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub from: String,
    pub to: String,
    pub label: Option<String>,
}

impl Graph {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            comment: None,
            direction: Direction::default(),
            title: None,
            title_loc: LabelLoc::default(),
            font: Font::default(),
            default_shape: None,
            default_style: Vec::new(),
            clusters: Vec::new(),
            nodes: Vec::new(),
            edges: Vec::new(),
        }
    }

    /// Every node in declaration order: cluster members first, then top-level nodes.
    pub fn all_nodes(&self) -> impl Iterator<Item = &Node> {
        self.clusters
            .iter()
            .flat_map(|c| c.nodes.iter())
            .chain(self.nodes.iter())
    }

    pub fn node_count(&self) -> usize {
        self.all_nodes().count()
    }

    pub fn find_node(&self, id: &str) -> Option<&Node> {
        self.all_nodes().find(|n| n.id == id)
    }

    pub fn cluster_of(&self, node_id: &str) -> Option<&Cluster> {
        self.clusters
            .iter()
            .find(|c| c.nodes.iter().any(|n| n.id == node_id))
    }

    /// Checks that node ids are unique and every edge endpoint exists.
    pub fn validate(&self) -> Result<(), RenderingError> {
        let mut seen: HashSet<&str> = HashSet::new();
        for node in self.all_nodes() {
            if !seen.insert(node.id.as_str()) {
                return Err(RenderingError::DuplicateNode(node.id.clone()));
            }
        }

        for edge in &self.edges {
            for endpoint in [&edge.from, &edge.to] {
                if !seen.contains(endpoint.as_str()) {
                    return Err(RenderingError::DanglingEdge {
                        from: edge.from.clone(),
                        to: edge.to.clone(),
                        missing: endpoint.clone(),
                    });
                }
            }
        }
        Ok(())
    }
}

impl Cluster {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            style: Vec::new(),
            color: None,
            nodes: Vec::new(),
        }
    }

    pub fn filled(mut self, color: impl Into<String>) -> Self {
        if !self.style.contains(&StyleFlag::Filled) {
            self.style.push(StyleFlag::Filled);
        }
        self.color = Some(color.into());
        self
    }

    pub fn node(mut self, node: Node) -> Self {
        self.nodes.push(node);
        self
    }
}

impl Node {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            shape: None,
            fill_color: None,
            style: Vec::new(),
        }
    }

    pub fn shape(mut self, shape: NodeShape) -> Self {
        self.shape = Some(shape);
        self
    }

    pub fn filled(mut self, color: impl Into<String>) -> Self {
        self.fill_color = Some(color.into());
        self.style = vec![StyleFlag::Filled];
        self
    }
}

impl Edge {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            label: None,
        }
    }

    pub fn labeled(from: impl Into<String>, to: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            label: Some(label.into()),
            ..Self::new(from, to)
        }
    }
}
