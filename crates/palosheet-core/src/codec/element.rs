use palosheet_cell::{ArrayBuilder, Value};

use super::{Decode, Encode, field, optional_field, record, record_between, string_array};
use crate::error::{PaloError, Result};
use crate::types::{
    AxisElement, AxisSelector, ChildElementInfo, ConsolidationElement, ConsolidationElementInfo,
    DimensionElementInfo, DimensionElementInfoSimple, DimensionElementType, ELEMENTS_ALL,
    ElementList, ParentElementInfo,
};

impl Encode for DimensionElementType {
    fn encode(&self) -> Result<Value> {
        Ok(Value::from(self.as_str()))
    }
}

impl Decode for DimensionElementType {
    fn decode(value: &Value) -> Result<Self> {
        let s = value.as_string()?;
        DimensionElementType::from_keyword(&s).ok_or(PaloError::InvalidDimensionElementType(s))
    }
}

impl Encode for ParentElementInfo {
    fn encode(&self) -> Result<Value> {
        let mut a = ArrayBuilder::new(1);
        a.append_named("identifier", self.identifier)?;
        Ok(a.finish()?)
    }
}

impl Decode for ParentElementInfo {
    fn decode(value: &Value) -> Result<Self> {
        let mut c = record(value, "ParentElementInfo", 1)?;
        Ok(ParentElementInfo {
            identifier: field(&mut c)?,
        })
    }
}

impl Encode for ChildElementInfo {
    fn encode(&self) -> Result<Value> {
        let mut a = ArrayBuilder::new(2);
        a.append_named("identifier", self.identifier)?
            .append_named("weight", self.weight)?;
        Ok(a.finish()?)
    }
}

impl Decode for ChildElementInfo {
    fn decode(value: &Value) -> Result<Self> {
        let mut c = record(value, "ChildElementInfo", 2)?;
        Ok(ChildElementInfo {
            identifier: field(&mut c)?,
            weight: field(&mut c)?,
        })
    }
}

impl Encode for DimensionElementInfoSimple {
    fn encode(&self) -> Result<Value> {
        let mut a = ArrayBuilder::new(3);
        a.append_named("name", &self.name)?
            .append_named("type", self.element_type.encode()?)?
            .append_named("identifier", self.identifier)?;
        Ok(a.finish()?)
    }
}

impl Decode for DimensionElementInfoSimple {
    fn decode(value: &Value) -> Result<Self> {
        let mut c = record(value, "DimensionElementInfoSimple", 3)?;
        Ok(DimensionElementInfoSimple {
            name: field(&mut c)?,
            element_type: field(&mut c)?,
            identifier: field(&mut c)?,
        })
    }
}

impl Encode for ConsolidationElementInfo {
    fn encode(&self) -> Result<Value> {
        let mut a = ArrayBuilder::new(4);
        a.append_named("name", &self.name)?
            .append_named("type", self.element_type.encode()?)?
            .append_named("identifier", self.identifier)?
            .append_named("weight", self.weight)?;
        Ok(a.finish()?)
    }
}

impl Decode for ConsolidationElementInfo {
    fn decode(value: &Value) -> Result<Self> {
        let mut c = record(value, "ConsolidationElementInfo", 4)?;
        Ok(ConsolidationElementInfo {
            name: field(&mut c)?,
            element_type: field(&mut c)?,
            identifier: field(&mut c)?,
            weight: field(&mut c)?,
        })
    }
}

impl Encode for DimensionElementInfo {
    fn encode(&self) -> Result<Value> {
        let mut a = ArrayBuilder::new(11 + usize::from(self.permission.is_some()));
        a.append_named("identifier", self.identifier)?
            .append_named("name", &self.name)?
            .append_named("type", self.element_type.encode()?)?
            .append_named("level", self.level)?
            .append_named("indent", self.indent)?
            .append_named("depth", self.depth)?
            .append_named("position", self.position)?
            .append_named("num_children", self.children.len())?
            .append_named("num_parents", self.parents.len())?
            .append_named("children", self.children.encode()?)?
            .append_named("parents", self.parents.encode()?)?;
        if let Some(permission) = &self.permission {
            a.append_named("permission", permission)?;
        }
        Ok(a.finish()?)
    }
}

impl Decode for DimensionElementInfo {
    fn decode(value: &Value) -> Result<Self> {
        let mut c = record_between(value, "DimensionElementInfo", 11, 12)?;
        let identifier = field(&mut c)?;
        let name = field(&mut c)?;
        let element_type = field(&mut c)?;
        let level = field(&mut c)?;
        let indent = field(&mut c)?;
        let depth = field(&mut c)?;
        let position = field(&mut c)?;
        // Counts are implied by the lists that follow.
        c.skip_values(2)?;
        Ok(DimensionElementInfo {
            identifier,
            name,
            element_type,
            level,
            indent,
            depth,
            position,
            children: field(&mut c)?,
            parents: field(&mut c)?,
            permission: optional_field(&mut c)?,
        })
    }
}

impl Encode for ConsolidationElement {
    fn encode(&self) -> Result<Value> {
        let mut a = ArrayBuilder::new(2);
        a.append_named("name", &self.name)?
            .append_named("weight", self.weight)?;
        Ok(a.finish()?)
    }
}

impl Decode for ConsolidationElement {
    /// Exactly two fields, name and weight; any other count is rejected.
    fn decode(value: &Value) -> Result<Self> {
        let mut c = value.as_array()?;
        let found = c.remaining();
        if found != 2 {
            return Err(PaloError::InvalidConsolidationElement { found });
        }
        Ok(ConsolidationElement {
            name: field(&mut c)?,
            weight: field(&mut c)?,
        })
    }
}

impl Encode for ElementList {
    fn encode(&self) -> Result<Value> {
        match self {
            ElementList::All => Ok(Value::from(ELEMENTS_ALL)),
            ElementList::Names(names) => names.encode(),
        }
    }
}

impl Decode for ElementList {
    fn decode(value: &Value) -> Result<Self> {
        if let Value::String(s) = value
            && s == ELEMENTS_ALL
        {
            return Ok(ElementList::All);
        }
        Ok(ElementList::Names(string_array(value, false)?))
    }
}

impl AxisElement {
    fn selected_member(&self, member: AxisSelector) -> Value {
        match member {
            AxisSelector::NAME => Value::from(&self.name),
            AxisSelector::TYPE => Value::from(self.element_type.as_str()),
            AxisSelector::ALIAS => Value::from(self.display_alias()),
            AxisSelector::HAS_CHILDREN => Value::Bool(self.has_children),
            AxisSelector::HAS_PARENTS => Value::Bool(self.has_parents),
            AxisSelector::AXIS => Value::from(self.axis),
            AxisSelector::INDENT => Value::from(self.indent),
            _ => Value::from(self.line),
        }
    }

    /// Encode the members chosen by `selector`.
    ///
    /// A single member is encoded as a scalar, several as an array in bit order.
    pub fn encode_selected(&self, selector: AxisSelector) -> Result<Value> {
        const MEMBERS: [(AxisSelector, &str); 8] = [
            (AxisSelector::NAME, "name"),
            (AxisSelector::TYPE, "type"),
            (AxisSelector::ALIAS, "alias"),
            (AxisSelector::HAS_CHILDREN, "has_children"),
            (AxisSelector::HAS_PARENTS, "has_parents"),
            (AxisSelector::AXIS, "axis"),
            (AxisSelector::INDENT, "indent"),
            (AxisSelector::LINE, "line"),
        ];

        match selector.count() {
            0 => Err(PaloError::InvalidAxisSelector),
            1 => {
                let member = MEMBERS
                    .iter()
                    .find(|(bit, _)| selector.contains(*bit))
                    .map(|(bit, _)| *bit)
                    .ok_or(PaloError::InvalidAxisSelector)?;
                Ok(self.selected_member(member))
            }
            count => {
                let mut a = ArrayBuilder::new(count);
                for (bit, name) in MEMBERS.iter().filter(|(bit, _)| selector.contains(*bit)) {
                    a.append_named(name, self.selected_member(*bit))?;
                }
                Ok(a.finish()?)
            }
        }
    }

    pub fn encode_all_selected(elements: &[AxisElement], selector: AxisSelector) -> Result<Value> {
        let mut a = ArrayBuilder::new(elements.len());
        for element in elements {
            a.append(element.encode_selected(selector)?)?;
        }
        Ok(a.finish()?)
    }
}
