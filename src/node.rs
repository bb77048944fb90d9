/// One decoded record: the node's path, root to node, as explicit labels,
/// plus its properties. Records are self-describing and never reference each
/// other, except incidentally through the decoder's shared string window.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NodeData {
    pub path_elements: Vec<String>,
    pub properties: Vec<NodeProperty>,
}

impl NodeData {
    pub fn new(path_elements: Vec<String>, properties: Vec<NodeProperty>) -> Self {
        NodeData {
            path_elements,
            properties,
        }
    }
}

/// A single property of a node. Values are string-encoded; a null value is
/// distinct from the empty string. A single-valued property carries exactly
/// one value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NodeProperty {
    pub name: String,
    pub value_type: ValueType,
    pub multi_valued: bool,
    pub values: Vec<Option<String>>,
}

impl NodeProperty {
    pub fn single(name: impl Into<String>, value_type: ValueType, value: Option<String>) -> Self {
        NodeProperty {
            name: name.into(),
            value_type,
            multi_valued: false,
            values: vec![value],
        }
    }

    pub fn multi(
        name: impl Into<String>,
        value_type: ValueType,
        values: Vec<Option<String>>,
    ) -> Self {
        NodeProperty {
            name: name.into(),
            value_type,
            multi_valued: true,
            values,
        }
    }
}

/// The kind of value a property holds.
///
/// The ordinal of each member is written to the wire as a single byte and is
/// shared with every dump already in existence. Reordering or inserting
/// members is a format break and requires an explicit version bump.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ValueType {
    Null = 0,
    String = 1,
    Binary = 2,
    Long = 3,
    Double = 4,
    Date = 5,
    Boolean = 6,
    Name = 7,
    Path = 8,
    Reference = 9,
    WeakReference = 10,
    Uri = 11,
    Decimal = 12,
}

impl TryFrom<u8> for ValueType {
    type Error = u8;
    fn try_from(val: u8) -> Result<ValueType, u8> {
        match val {
            0 => Ok(ValueType::Null),
            1 => Ok(ValueType::String),
            2 => Ok(ValueType::Binary),
            3 => Ok(ValueType::Long),
            4 => Ok(ValueType::Double),
            5 => Ok(ValueType::Date),
            6 => Ok(ValueType::Boolean),
            7 => Ok(ValueType::Name),
            8 => Ok(ValueType::Path),
            9 => Ok(ValueType::Reference),
            10 => Ok(ValueType::WeakReference),
            11 => Ok(ValueType::Uri),
            12 => Ok(ValueType::Decimal),
            _ => Err(val),
        }
    }
}

impl From<ValueType> for u8 {
    fn from(val: ValueType) -> u8 {
        val as u8
    }
}
