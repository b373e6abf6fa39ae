//! System-wide constants for the RiceChain contract.

/// `assetType` tag stored on every rice batch document.
pub const ASSET_TYPE_RICE_BATCH: &str = "riceBatch";

/// `assetType` tag stored on every processing order document.
pub const ASSET_TYPE_PROCESSING_ORDER: &str = "processingOrder";

/// Default name of the restricted collection holding processing orders.
pub const DEFAULT_ORDER_COLLECTION: &str = "ProcessingOrderCollection";

/// Default organization identifier of the farmer.
pub const DEFAULT_FARMER_ORG: &str = "Org1MSP";

/// Default organization identifier of the miller.
pub const DEFAULT_MILLER_ORG: &str = "Org2MSP";

/// Default organization identifier of the retailer.
pub const DEFAULT_RETAILER_ORG: &str = "Org3MSP";

/// Transient field carrying the order's rice variety.
pub const TRANSIENT_VARIETY: &str = "variety";

/// Transient field carrying the miller's name.
pub const TRANSIENT_MILLER_NAME: &str = "millerName";

/// Transient field carrying the requested quantity (decimal string).
pub const TRANSIENT_QUANTITY: &str = "quantityInKg";

/// Wire form of the initial batch status.
pub const STATUS_HARVESTED: &str = "Harvested";

/// Wire prefix of the assigned status; the miller name follows.
pub const STATUS_ASSIGNED_PREFIX: &str = "Assigned to Miller ";

/// Wire prefix of the dispatched status; the retailer name follows.
pub const STATUS_DISPATCHED_PREFIX: &str = "Dispatched to ";
