//! xdg-foreign request definitions
//!
//! Requests arrive already demarshalled by the transport: the target object
//! is resolved to one of our identifiers and the arguments are typed.

use super::types::*;

/// zxdg_exporter_v1.destroy
pub const EXPORTER_DESTROY: u16 = 0;
/// zxdg_exporter_v1.export
pub const EXPORTER_EXPORT: u16 = 1;
/// zxdg_exported_v1.destroy
pub const EXPORTED_DESTROY: u16 = 0;
/// zxdg_importer_v1.destroy
pub const IMPORTER_DESTROY: u16 = 0;
/// zxdg_importer_v1.import
pub const IMPORTER_IMPORT: u16 = 1;
/// zxdg_imported_v1.destroy
pub const IMPORTED_DESTROY: u16 = 0;
/// zxdg_imported_v1.set_parent_of
pub const IMPORTED_SET_PARENT_OF: u16 = 1;

/// Requests on a `zxdg_exporter_v1`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExporterRequest {
    Destroy,
    Export { surface: SurfaceId },
}

/// Requests on a `zxdg_exported_v1`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportedRequest {
    Destroy,
}

/// Requests on a `zxdg_importer_v1`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImporterRequest {
    Destroy,
    Import { handle: String },
}

/// Requests on a `zxdg_imported_v1`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportedRequest {
    Destroy,
    SetParentOf { surface: SurfaceId },
}

/// A request addressed to one foreign protocol object
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    Exporter(ExporterId, ExporterRequest),
    Exported(ExportId, ExportedRequest),
    Importer(ImporterId, ImporterRequest),
    Imported(ImportId, ImportedRequest),
}

impl Request {
    /// Target object of the request
    pub fn object(&self) -> ObjectId {
        match self {
            Request::Exporter(id, _) => ObjectId::Exporter(*id),
            Request::Exported(id, _) => ObjectId::Exported(*id),
            Request::Importer(id, _) => ObjectId::Importer(*id),
            Request::Imported(id, _) => ObjectId::Imported(*id),
        }
    }

    /// Wire opcode of the request within its interface
    pub fn opcode(&self) -> u16 {
        match self {
            Request::Exporter(_, ExporterRequest::Destroy) => EXPORTER_DESTROY,
            Request::Exporter(_, ExporterRequest::Export { .. }) => EXPORTER_EXPORT,
            Request::Exported(_, ExportedRequest::Destroy) => EXPORTED_DESTROY,
            Request::Importer(_, ImporterRequest::Destroy) => IMPORTER_DESTROY,
            Request::Importer(_, ImporterRequest::Import { .. }) => IMPORTER_IMPORT,
            Request::Imported(_, ImportedRequest::Destroy) => IMPORTED_DESTROY,
            Request::Imported(_, ImportedRequest::SetParentOf { .. }) => IMPORTED_SET_PARENT_OF,
        }
    }

    /// Request name as written in the protocol description
    pub fn name(&self) -> &'static str {
        match self {
            Request::Exporter(_, ExporterRequest::Export { .. }) => "export",
            Request::Importer(_, ImporterRequest::Import { .. }) => "import",
            Request::Imported(_, ImportedRequest::SetParentOf { .. }) => "set_parent_of",
            _ => "destroy",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_opcodes() {
        let imported = ImportId {
            importer: ImporterId(1),
            serial: 2,
        };
        let req = Request::Imported(
            imported,
            ImportedRequest::SetParentOf {
                surface: SurfaceId(7),
            },
        );
        assert_eq!(req.opcode(), 1);
        assert_eq!(req.name(), "set_parent_of");
        assert_eq!(req.object(), ObjectId::Imported(imported));

        let req = Request::Exporter(ExporterId(3), ExporterRequest::Destroy);
        assert_eq!(req.opcode(), 0);
        assert_eq!(req.name(), "destroy");
    }
}
