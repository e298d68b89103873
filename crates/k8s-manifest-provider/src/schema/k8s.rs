//! Schema declarations for Kubernetes core types embedded in custom resource specs.
//!
//! The models are the [`k8s_openapi`] types themselves, only the fields declared here can be
//! configured.

use k8s_openapi::{
    api::core::v1::{
        ConfigMapKeySelector, EmptyDirVolumeSource, EnvVar, LocalObjectReference,
        PersistentVolumeClaimSpec, ResourceRequirements, SecretKeySelector, Toleration,
        TypedLocalObjectReference, VolumeMount, VolumeResourceRequirements,
    },
    apimachinery::pkg::apis::meta::v1::{LabelSelector, LabelSelectorRequirement},
};

use crate::schema::{Attribute, Attributes, ElementType, NestedSchema, Validator};

impl NestedSchema for LabelSelector {
    fn attributes() -> Attributes {
        Attributes::new()
            .attribute(
                "match_expressions",
                Attribute::list_of::<LabelSelectorRequirement>().description(
                    "matchExpressions is a list of label selector requirements. The requirements are ANDed.",
                ),
            )
            .attribute(
                "match_labels",
                Attribute::map(ElementType::String).description(
                    "matchLabels is a map of {key,value} pairs. A single {key,value} in the matchLabels map is equivalent to an element of matchExpressions, whose key field is 'key', the operator is 'In', and the values array contains only 'value'. The requirements are ANDed.",
                ),
            )
    }
}

impl NestedSchema for LabelSelectorRequirement {
    fn attributes() -> Attributes {
        Attributes::new()
            .attribute(
                "key",
                Attribute::string()
                    .required()
                    .description("key is the label key that the selector applies to."),
            )
            .attribute(
                "operator",
                Attribute::string()
                    .required()
                    .description("operator represents a key's relationship to a set of values. Valid operators are In, NotIn, Exists and DoesNotExist."),
            )
            .attribute(
                "values",
                Attribute::list(ElementType::String)
                    .description("values is an array of string values. If the operator is In or NotIn, the values array must be non-empty. If the operator is Exists or DoesNotExist, the values array must be empty."),
            )
    }
}

impl NestedSchema for ResourceRequirements {
    fn attributes() -> Attributes {
        Attributes::new()
            .attribute(
                "limits",
                Attribute::map(ElementType::String)
                    .description("Limits describes the maximum amount of compute resources allowed."),
            )
            .attribute(
                "requests",
                Attribute::map(ElementType::String)
                    .description("Requests describes the minimum amount of compute resources required. If Requests is omitted for a container, it defaults to Limits if that is explicitly specified, otherwise to an implementation-defined value."),
            )
    }
}

impl NestedSchema for VolumeResourceRequirements {
    fn attributes() -> Attributes {
        Attributes::new()
            .attribute(
                "limits",
                Attribute::map(ElementType::String)
                    .description("Limits describes the maximum amount of compute resources allowed."),
            )
            .attribute(
                "requests",
                Attribute::map(ElementType::String)
                    .description("Requests describes the minimum amount of compute resources required."),
            )
    }
}

impl NestedSchema for Toleration {
    fn attributes() -> Attributes {
        Attributes::new()
            .attribute(
                "effect",
                Attribute::string()
                    .description("Effect indicates the taint effect to match. Empty means match all taint effects. When specified, allowed values are NoSchedule, PreferNoSchedule and NoExecute."),
            )
            .attribute(
                "key",
                Attribute::string()
                    .description("Key is the taint key that the toleration applies to. Empty means match all taint keys."),
            )
            .attribute(
                "operator",
                Attribute::string()
                    .description("Operator represents a key's relationship to the value. Valid operators are Exists and Equal. Defaults to Equal."),
            )
            .attribute(
                "toleration_seconds",
                Attribute::int64()
                    .description("TolerationSeconds represents the period of time the toleration (which must be of effect NoExecute, otherwise this field is ignored) tolerates the taint."),
            )
            .attribute(
                "value",
                Attribute::string()
                    .description("Value is the taint value the toleration matches to. If the operator is Exists, the value should be empty, otherwise just a regular string."),
            )
    }
}

impl NestedSchema for PersistentVolumeClaimSpec {
    fn attributes() -> Attributes {
        Attributes::new()
            .attribute(
                "access_modes",
                Attribute::list(ElementType::String)
                    .description("accessModes contains the desired access modes the volume should have."),
            )
            .attribute(
                "data_source",
                Attribute::nested::<TypedLocalObjectReference>()
                    .description("dataSource field can be used to specify either an existing VolumeSnapshot object, an existing PVC or an existing custom resource that implements data population."),
            )
            .attribute(
                "resources",
                Attribute::nested::<VolumeResourceRequirements>()
                    .description("resources represents the minimum resources the volume should have."),
            )
            .attribute(
                "selector",
                Attribute::nested::<LabelSelector>()
                    .description("selector is a label query over volumes to consider for binding."),
            )
            .attribute(
                "storage_class_name",
                Attribute::string()
                    .description("storageClassName is the name of the StorageClass required by the claim."),
            )
            .attribute(
                "volume_mode",
                Attribute::string()
                    .description("volumeMode defines what type of volume is required by the claim. Value of Filesystem is implied when not included in claim spec."),
            )
            .attribute(
                "volume_name",
                Attribute::string()
                    .description("volumeName is the binding reference to the PersistentVolume backing this claim."),
            )
    }
}

impl NestedSchema for TypedLocalObjectReference {
    fn attributes() -> Attributes {
        Attributes::new()
            .attribute(
                "api_group",
                Attribute::string()
                    .description("APIGroup is the group for the resource being referenced. If APIGroup is not specified, the specified Kind must be in the core API group."),
            )
            .attribute(
                "kind",
                Attribute::string()
                    .required()
                    .description("Kind is the type of resource being referenced"),
            )
            .attribute(
                "name",
                Attribute::string()
                    .required()
                    .description("Name is the name of resource being referenced"),
            )
    }
}

impl NestedSchema for EmptyDirVolumeSource {
    fn attributes() -> Attributes {
        Attributes::new()
            .attribute(
                "medium",
                Attribute::string()
                    .description("medium represents what type of storage medium should back this directory. The default is \"\" which means to use the node's default medium."),
            )
            .attribute(
                "size_limit",
                Attribute::string()
                    .description("sizeLimit is the total amount of local storage required for this EmptyDir volume."),
            )
    }
}

impl NestedSchema for SecretKeySelector {
    fn attributes() -> Attributes {
        Attributes::new()
            .attribute(
                "key",
                Attribute::string()
                    .required()
                    .description("The key of the secret to select from. Must be a valid secret key."),
            )
            .attribute(
                "name",
                Attribute::string()
                    .required()
                    .description("Name of the referent.")
                    .validator(Validator::ObjectName),
            )
            .attribute(
                "optional",
                Attribute::boolean()
                    .description("Specify whether the Secret or its key must be defined"),
            )
    }
}

impl NestedSchema for ConfigMapKeySelector {
    fn attributes() -> Attributes {
        Attributes::new()
            .attribute(
                "key",
                Attribute::string()
                    .required()
                    .description("The key to select."),
            )
            .attribute(
                "name",
                Attribute::string()
                    .required()
                    .description("Name of the referent.")
                    .validator(Validator::ObjectName),
            )
            .attribute(
                "optional",
                Attribute::boolean()
                    .description("Specify whether the ConfigMap or its key must be defined"),
            )
    }
}

impl NestedSchema for LocalObjectReference {
    fn attributes() -> Attributes {
        Attributes::new().attribute(
            "name",
            Attribute::string()
                .required()
                .description("Name of the referent.")
                .validator(Validator::ObjectName),
        )
    }
}

impl NestedSchema for EnvVar {
    fn attributes() -> Attributes {
        Attributes::new()
            .attribute(
                "name",
                Attribute::string()
                    .required()
                    .description("Name of the environment variable."),
            )
            .attribute(
                "value",
                Attribute::string()
                    .description("Variable references $(VAR_NAME) are expanded using the previously defined environment variables in the container and any service environment variables."),
            )
    }
}

impl NestedSchema for VolumeMount {
    fn attributes() -> Attributes {
        Attributes::new()
            .attribute(
                "mount_path",
                Attribute::string()
                    .required()
                    .description("Path within the container at which the volume should be mounted. Must not contain ':'."),
            )
            .attribute(
                "name",
                Attribute::string()
                    .required()
                    .description("This must match the Name of a Volume."),
            )
            .attribute(
                "read_only",
                Attribute::boolean()
                    .description("Mounted read-only if true, read-write otherwise (false or unspecified). Defaults to false."),
            )
            .attribute(
                "sub_path",
                Attribute::string()
                    .description("Path within the volume from which the container's volume should be mounted. Defaults to \"\" (volume's root)."),
            )
    }
}
