use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct IOAttribute {
    #[serde(rename = "@name")]
    pub name: String,
    #[serde(rename = "@class")]
    pub class: String,
    #[serde(rename = "$value", default)]
    pub value: String,
}

impl IOAttribute {
    pub fn new(name: &str, class: &str, value: &str) -> Self {
        IOAttribute {
            name: name.to_string(),
            class: class.to_string(),
            value: value.to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, PartialEq, Clone, Default)]
pub struct IOAttributes {
    #[serde(rename = "attribute", default)]
    pub attributes: Vec<IOAttribute>,
}

impl IOAttributes {
    pub fn find(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|attr| attr.name.eq(name))
            .map(|attr| attr.value.as_str())
    }
}
