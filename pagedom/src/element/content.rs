#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Content {
    #[default]
    None,
    /// A single text node child.
    Text(String),
    Children(Vec<super::Element>),
}
