use std::collections::HashMap;
use std::path::Path;

use crate::error::LoadError;
use crate::model::{Element, PropertySets, PropertyValue};
use crate::parser::step::{StepEntity, StepFile};

/// Concrete entity types enumerated as the generic product category.
///
/// STEP files carry leaf types only, so the placeable-product class is
/// spelled out as the concrete entities a building model can contain,
/// including the spatial containers and annotations that the extraction
/// pipeline later filters away.
const PRODUCT_TYPES: &[&str] = &[
    // Building elements
    "IFCWALL",
    "IFCWALLSTANDARDCASE",
    "IFCSLAB",
    "IFCBEAM",
    "IFCCOLUMN",
    "IFCDOOR",
    "IFCWINDOW",
    "IFCSTAIR",
    "IFCSTAIRFLIGHT",
    "IFCRAMP",
    "IFCRAMPFLIGHT",
    "IFCROOF",
    "IFCRAILING",
    "IFCCOVERING",
    "IFCCURTAINWALL",
    "IFCPLATE",
    "IFCMEMBER",
    "IFCFOOTING",
    "IFCPILE",
    "IFCBUILDINGELEMENTPROXY",
    "IFCFURNISHINGELEMENT",
    "IFCTRANSPORTELEMENT",
    "IFCELEMENTASSEMBLY",
    "IFCREINFORCINGBAR",
    "IFCREINFORCINGMESH",
    "IFCTENDON",
    "IFCDISCRETEACCESSORY",
    "IFCFASTENER",
    "IFCMECHANICALFASTENER",
    "IFCOPENINGELEMENT",
    "IFCVIRTUALELEMENT",
    "IFCGEOGRAPHICELEMENT",
    // Distribution elements
    "IFCDISTRIBUTIONELEMENT",
    "IFCDISTRIBUTIONCONTROLELEMENT",
    "IFCFLOWTERMINAL",
    "IFCFLOWSEGMENT",
    "IFCFLOWFITTING",
    "IFCFLOWCONTROLLER",
    "IFCFLOWMOVINGDEVICE",
    "IFCFLOWSTORAGEDEVICE",
    "IFCFLOWTREATMENTDEVICE",
    "IFCENERGYCONVERSIONDEVICE",
    "IFCSANITARYTERMINAL",
    // Spatial structure and annotations
    "IFCSITE",
    "IFCBUILDING",
    "IFCBUILDINGSTOREY",
    "IFCSPACE",
    "IFCANNOTATION",
    "IFCGRID",
];

/// An opened IFC model, indexed for property extraction.
#[derive(Debug)]
pub struct IfcModel {
    step: StepFile,
    /// Element id to the IFCPROPERTYSET / IFCELEMENTQUANTITY ids attached
    /// to it via IFCRELDEFINESBYPROPERTIES.
    definitions: HashMap<u64, Vec<u64>>,
}

/// Open and parse an IFC file.
///
/// # Errors
///
/// Returns [`LoadError::FileRead`] if the file cannot be read and
/// [`LoadError::InvalidStep`] if it is not STEP data. A readable model with
/// no product entities is not an error here; [`IfcModel::products`] simply
/// returns an empty list.
pub fn open_model<P: AsRef<Path>>(path: P) -> Result<IfcModel, LoadError> {
    let content = std::fs::read_to_string(&path).map_err(|source| LoadError::FileRead {
        path: path.as_ref().to_path_buf(),
        source,
    })?;

    let step = StepFile::parse(&content)?;
    Ok(IfcModel::new(step))
}

impl IfcModel {
    #[must_use]
    pub fn new(step: StepFile) -> Self {
        let definitions = index_property_definitions(&step);
        Self { step, definitions }
    }

    /// IFC schema identifier from the file header.
    #[must_use]
    pub fn schema(&self) -> &str {
        &self.step.schema
    }

    /// Every product-category entity, in ascending STEP-id order.
    #[must_use]
    pub fn products(&self) -> Vec<Element> {
        self.step
            .entities
            .values()
            .filter(|e| PRODUCT_TYPES.contains(&e.entity_type.as_str()))
            .map(|e| Element {
                id: e.id,
                entity_type: e.entity_type.clone(),
                // GlobalId and Name sit at the same attribute slots in
                // every rooted IFC entity.
                global_id: e.string_at(0),
                name: e.string_at(2),
            })
            .collect()
    }

    /// Assemble the property-set snapshot for one element.
    ///
    /// Covers IFCPROPERTYSET single values and IFCELEMENTQUANTITY members.
    /// Computed fresh per element, not cached.
    #[must_use]
    pub fn property_sets(&self, element_id: u64) -> PropertySets {
        let mut psets = PropertySets::new();

        let Some(definition_ids) = self.definitions.get(&element_id) else {
            return psets;
        };

        for &definition_id in definition_ids {
            let Some(definition) = self.step.get_entity(definition_id) else {
                continue;
            };

            let members = match definition.entity_type.as_str() {
                // IfcPropertySet: HasProperties at index 4
                "IFCPROPERTYSET" => self.read_members(definition.refs_at(4), read_single_value),
                // IfcElementQuantity: Quantities at index 5
                "IFCELEMENTQUANTITY" => self.read_members(definition.refs_at(5), read_quantity),
                _ => continue,
            };

            if let Some(set_name) = definition.string_at(2) {
                psets.entry(set_name).or_default().extend(members);
            }
        }

        psets
    }

    fn read_members(
        &self,
        member_ids: Vec<u64>,
        read: fn(&StepEntity) -> Option<(String, PropertyValue)>,
    ) -> Vec<(String, PropertyValue)> {
        member_ids
            .iter()
            .filter_map(|id| self.step.get_entity(*id))
            .filter_map(read)
            .collect()
    }
}

/// IfcPropertySingleValue: Name at 0, NominalValue at 2.
fn read_single_value(entity: &StepEntity) -> Option<(String, PropertyValue)> {
    if entity.entity_type != "IFCPROPERTYSINGLEVALUE" {
        return None;
    }
    let name = entity.string_at(0)?;
    let value = entity
        .values
        .get(2)
        .map_or(PropertyValue::Null, |v| v.to_property_value());
    Some((name, value))
}

/// IfcPhysicalSimpleQuantity subtypes: Name at 0, the measure at 3.
fn read_quantity(entity: &StepEntity) -> Option<(String, PropertyValue)> {
    const QUANTITY_TYPES: &[&str] = &[
        "IFCQUANTITYLENGTH",
        "IFCQUANTITYAREA",
        "IFCQUANTITYVOLUME",
        "IFCQUANTITYCOUNT",
        "IFCQUANTITYWEIGHT",
        "IFCQUANTITYTIME",
    ];
    if !QUANTITY_TYPES.contains(&entity.entity_type.as_str()) {
        return None;
    }
    let name = entity.string_at(0)?;
    let value = entity
        .values
        .get(3)
        .map_or(PropertyValue::Null, |v| v.to_property_value());
    Some((name, value))
}

/// Walk IFCRELDEFINESBYPROPERTIES: RelatedObjects at index 4, the relating
/// property definition at index 5.
fn index_property_definitions(step: &StepFile) -> HashMap<u64, Vec<u64>> {
    let mut definitions: HashMap<u64, Vec<u64>> = HashMap::new();

    for rel in step.entities_by_type("IFCRELDEFINESBYPROPERTIES") {
        let Some(definition_id) = rel.ref_at(5) else {
            continue;
        };
        for element_id in rel.refs_at(4) {
            definitions.entry(element_id).or_default().push(definition_id);
        }
    }

    definitions
}
