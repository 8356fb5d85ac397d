//! Core xdg-foreign protocol types
//!
//! Identifiers for every object the foreign protocol pair deals with. They
//! are small copyable values: a registry looks an identifier up and gets
//! `None` back once the object is gone, so no identifier can dangle.

use std::fmt;

/// Client connection ID, assigned by the display when a client connects
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClientId(pub u32);

impl ClientId {
    pub fn new(id: u32) -> Self {
        ClientId(id)
    }

    pub fn get(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "client#{}", self.0)
    }
}

/// Surface ID as known to the compositor's surface host
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SurfaceId(pub u32);

impl SurfaceId {
    pub fn new(id: u32) -> Self {
        SurfaceId(id)
    }

    pub fn get(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for SurfaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "surface@{}", self.0)
    }
}

/// A bound `zxdg_exporter_v1` (the per-client export registry)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ExporterId(pub u64);

impl ExporterId {
    pub fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ExporterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "zxdg_exporter_v1@{}", self.0)
    }
}

/// A `zxdg_exported_v1`, addressed through the exporter that owns it
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ExportId {
    /// Owning registry
    pub exporter: ExporterId,
    /// Serial unique for the lifetime of the coordinator
    pub serial: u64,
}

impl fmt::Display for ExportId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "zxdg_exported_v1@{}.{}", self.exporter.0, self.serial)
    }
}

/// A bound `zxdg_importer_v1` (the per-client import registry)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ImporterId(pub u64);

impl ImporterId {
    pub fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ImporterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "zxdg_importer_v1@{}", self.0)
    }
}

/// A `zxdg_imported_v1`, addressed through the importer that owns it
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ImportId {
    /// Owning registry
    pub importer: ImporterId,
    /// Serial unique for the lifetime of the coordinator
    pub serial: u64,
}

impl fmt::Display for ImportId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "zxdg_imported_v1@{}.{}", self.importer.0, self.serial)
    }
}

/// Any object of the foreign protocol pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectId {
    Exporter(ExporterId),
    Exported(ExportId),
    Importer(ImporterId),
    Imported(ImportId),
}

impl ObjectId {
    /// Protocol interface name of the object
    pub fn interface(&self) -> &'static str {
        match self {
            ObjectId::Exporter(_) => super::EXPORTER_INTERFACE,
            ObjectId::Exported(_) => super::EXPORTED_INTERFACE,
            ObjectId::Importer(_) => super::IMPORTER_INTERFACE,
            ObjectId::Imported(_) => super::IMPORTED_INTERFACE,
        }
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObjectId::Exporter(id) => id.fmt(f),
            ObjectId::Exported(id) => id.fmt(f),
            ObjectId::Importer(id) => id.fmt(f),
            ObjectId::Imported(id) => id.fmt(f),
        }
    }
}

impl From<ExporterId> for ObjectId {
    fn from(id: ExporterId) -> Self {
        ObjectId::Exporter(id)
    }
}

impl From<ExportId> for ObjectId {
    fn from(id: ExportId) -> Self {
        ObjectId::Exported(id)
    }
}

impl From<ImporterId> for ObjectId {
    fn from(id: ImporterId) -> Self {
        ObjectId::Importer(id)
    }
}

impl From<ImportId> for ObjectId {
    fn from(id: ImportId) -> Self {
        ObjectId::Imported(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_interface_names() {
        let exporter = ExporterId(1);
        let export = ExportId {
            exporter,
            serial: 2,
        };
        assert_eq!(ObjectId::from(exporter).interface(), "zxdg_exporter_v1");
        assert_eq!(ObjectId::from(export).interface(), "zxdg_exported_v1");
        assert_eq!(export.to_string(), "zxdg_exported_v1@1.2");
    }

    #[test]
    fn test_ids_order_by_owner_first() {
        let a = ImportId {
            importer: ImporterId(1),
            serial: 9,
        };
        let b = ImportId {
            importer: ImporterId(2),
            serial: 3,
        };
        assert!(a < b);
    }
}
