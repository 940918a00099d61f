//! Splits inline instance block devices into standalone volumes.
//!
//! An `aws_instance` may describe its volumes inline (`root_block_device`,
//! `ebs_block_device`), while the live account reports each volume as its
//! own `aws_ebs_volume`. This stage makes both sides speak in volumes:
//!
//! - inline entry with a sibling volume in the same set: copy the fields
//!   the sibling lacks onto it (the sibling's own values win)
//! - inline entry without a sibling: build the volume through the factory
//!   registry and add it
//! - when mapping the declared side, either way, also copy the inline-only
//!   fields onto the live volume with that id, since volume enumeration
//!   does not report attachment-declared settings
//! - finally strip the inline attributes and `volume_tags` from the instance
//!
//! Entries are matched by `volume_id`, never by position.

use crate::errors::{DriftwatchError, DwError};
use crate::model::{AttrValue, Attributes, ResourceKey, ResourceSet};
use crate::registry::TypeRegistry;
use crate::resources::aws::aws_instance::{EBS_BLOCK_DEVICE, ROOT_BLOCK_DEVICE, VOLUME_TAGS};
use crate::resources::aws::{AWS_EBS_VOLUME, AWS_INSTANCE};
use std::collections::BTreeMap;

use super::Middleware;

pub const STAGE_NAME: &str = "aws_instance_block_device";

/// Inline attribute name -> volume attribute name
const FIELD_MAPPING: &[(&str, &str)] = &[
    ("encrypted", "encrypted"),
    ("iops", "iops"),
    ("kms_key_id", "kms_key_id"),
    ("throughput", "throughput"),
    ("volume_size", "size"),
    ("volume_type", "type"),
];

#[derive(Debug, Clone, Copy, Default)]
pub struct AwsInstanceBlockDeviceMapper;

impl Middleware for AwsInstanceBlockDeviceMapper {
    fn name(&self) -> &'static str {
        STAGE_NAME
    }

    fn execute(
        &self,
        registry: &TypeRegistry,
        declared: &mut ResourceSet,
        live: &mut ResourceSet,
    ) -> Vec<DwError> {
        let mut errors = Vec::new();
        map_set(registry, declared, Some(live), &mut errors);
        map_set(registry, live, None, &mut errors);
        errors
    }
}

/// One inline block device, detached from its instance
struct InlineEntry {
    field_path: String,
    attributes: BTreeMap<String, AttrValue>,
}

/// Context shared by every entry of one instance
struct ParentContext<'a> {
    instance: &'a ResourceKey,
    availability_zone: Option<AttrValue>,
    volume_tags: Option<AttrValue>,
}

fn map_set(
    registry: &TypeRegistry,
    set: &mut ResourceSet,
    mut counterpart: Option<&mut ResourceSet>,
    errors: &mut Vec<DwError>,
) {
    for key in set.keys_of_type(AWS_INSTANCE) {
        let Some(instance) = set.get_mut(&key) else {
            continue;
        };

        let mut entries = Vec::new();
        for field in [ROOT_BLOCK_DEVICE, EBS_BLOCK_DEVICE] {
            match instance.attributes.remove(field) {
                None | Some(AttrValue::Null) => {}
                Some(AttrValue::List(items)) => {
                    for (index, item) in items.into_iter().enumerate() {
                        let field_path = format!("{}.{}", field, index);
                        match item {
                            AttrValue::Map(attributes) => entries.push(InlineEntry {
                                field_path,
                                attributes,
                            }),
                            other => errors.push(entry_error(
                                &key,
                                DriftwatchError::MalformedAttribute {
                                    resource_type: key.resource_type.clone(),
                                    resource_id: key.id.clone(),
                                    field: field_path,
                                    expected: "map".to_string(),
                                    found: other.kind_name().to_string(),
                                },
                            )),
                        }
                    }
                }
                Some(other) => {
                    errors.push(entry_error(
                        &key,
                        DriftwatchError::MalformedAttribute {
                            resource_type: key.resource_type.clone(),
                            resource_id: key.id.clone(),
                            field: field.to_string(),
                            expected: "list of maps".to_string(),
                            found: other.kind_name().to_string(),
                        },
                    ));
                    // Leave what we cannot interpret where it was
                    instance.attributes.insert(field, other);
                }
            }
        }

        let volume_tags = instance.attributes.remove(VOLUME_TAGS);
        let parent = ParentContext {
            instance: &key,
            availability_zone: instance.attributes.get("availability_zone").cloned(),
            volume_tags,
        };

        for entry in entries {
            if let Err(e) = map_entry(registry, set, counterpart.as_deref_mut(), &parent, entry) {
                errors.push(e);
            }
        }
    }
}

fn map_entry(
    registry: &TypeRegistry,
    set: &mut ResourceSet,
    counterpart: Option<&mut ResourceSet>,
    parent: &ParentContext<'_>,
    entry: InlineEntry,
) -> Result<(), DwError> {
    let Some(volume_id) = entry
        .attributes
        .get("volume_id")
        .and_then(AttrValue::as_str)
        .map(str::to_string)
    else {
        return Err(entry_error(
            parent.instance,
            DriftwatchError::MissingAttribute {
                resource_type: parent.instance.resource_type.clone(),
                resource_id: parent.instance.id.clone(),
                field: format!("{}.volume_id", entry.field_path),
            },
        ));
    };

    let inline_fields = volume_fields(&entry.attributes);
    let volume_key = ResourceKey::new(AWS_EBS_VOLUME, volume_id.clone());

    if let Some(sibling) = set.get_mut(&volume_key) {
        let merged = merge_absent(&mut sibling.attributes, &inline_fields);
        tracing::debug!(
            stage = STAGE_NAME,
            instance = %parent.instance,
            resource_id = %volume_id,
            merged,
            "merged inline block device into sibling volume"
        );
    } else {
        synthesize_volume(registry, set, parent, &volume_id, &inline_fields)?;
    }

    if let Some(live_volume) = counterpart.and_then(|other| other.get_mut(&volume_key)) {
        merge_absent(&mut live_volume.attributes, &inline_fields);
    }

    Ok(())
}

fn synthesize_volume(
    registry: &TypeRegistry,
    set: &mut ResourceSet,
    parent: &ParentContext<'_>,
    volume_id: &str,
    inline_fields: &Attributes,
) -> Result<(), DwError> {
    let mut raw = inline_fields.clone();
    if let Some(az) = &parent.availability_zone {
        raw.insert("availability_zone", az.clone());
    }
    if let Some(tags @ AttrValue::Map(map)) = &parent.volume_tags {
        if !map.is_empty() {
            raw.insert("tags", tags.clone());
        }
    }
    raw.insert("multi_attach_enabled", false);

    let volume = registry
        .factories()
        .create(AWS_EBS_VOLUME, volume_id, raw)
        .map_err(|e| {
            DwError::from(e)
                .with_stage(STAGE_NAME)
                .with_op("synthesize_volume")
        })?;
    set.insert(volume)
        .map_err(|e| DwError::from(e).with_stage(STAGE_NAME))?;
    tracing::debug!(
        stage = STAGE_NAME,
        instance = %parent.instance,
        resource_id = %volume_id,
        "synthesized volume from inline block device"
    );
    Ok(())
}

/// Translate an inline entry into volume vocabulary, dropping nulls and
/// attachment-only fields (`device_name`, `delete_on_termination`)
fn volume_fields(entry: &BTreeMap<String, AttrValue>) -> Attributes {
    FIELD_MAPPING
        .iter()
        .filter_map(|(inline, volume)| match entry.get(*inline) {
            Some(value) if !value.is_null() => Some((volume.to_string(), value.clone())),
            _ => None,
        })
        .collect()
}

/// Copy fields the target lacks; returns how many were copied
fn merge_absent(target: &mut Attributes, fields: &Attributes) -> usize {
    fields
        .iter()
        .filter(|(name, value)| target.insert_if_absent(name.as_str(), (*value).clone()))
        .count()
}

fn entry_error(instance: &ResourceKey, err: DriftwatchError) -> DwError {
    DwError::from(err)
        .with_stage(STAGE_NAME)
        .with_resource_type(instance.resource_type.clone())
        .with_resource_id(instance.id.clone())
}
