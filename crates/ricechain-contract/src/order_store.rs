//! Processing order persistence in the restricted collection.
//!
//! Reads of order contents require membership of the collection; the host
//! refuses them otherwise. Existence is checked through the private-data
//! hash, which every organization may read.

use ricechain_ledger::{Cursor, KeyValue, Ledger, RichQuery, TransientMap};
use ricechain_types::{
    AssetType, ContractConfig, OrderId, ProcessingOrder, QuantityPolicy, Result, RiceError,
    constants,
};

/// Restricted-collection adapter for [`ProcessingOrder`] records.
#[derive(Debug, Clone)]
pub struct OrderStore {
    collection: String,
    quantity_policy: QuantityPolicy,
}

impl OrderStore {
    #[must_use]
    pub fn new(collection: impl Into<String>, quantity_policy: QuantityPolicy) -> Self {
        Self {
            collection: collection.into(),
            quantity_policy,
        }
    }

    #[must_use]
    pub fn from_config(config: &ContractConfig) -> Self {
        Self::new(config.order_collection.clone(), config.quantity_policy)
    }

    #[must_use]
    pub fn collection(&self) -> &str {
        &self.collection
    }

    pub fn exists(&self, ledger: &dyn Ledger, order_id: &OrderId) -> Result<bool> {
        Ok(ledger
            .get_private_data_hash(&self.collection, order_id.as_str())?
            .is_some())
    }

    /// # Errors
    /// `OrderNotFound` if absent, `Unauthorized` if the caller is not a
    /// member of the collection.
    pub fn get(&self, ledger: &dyn Ledger, order_id: &OrderId) -> Result<ProcessingOrder> {
        let bytes = ledger
            .get_private_data(&self.collection, order_id.as_str())?
            .ok_or_else(|| RiceError::OrderNotFound(order_id.clone()))?;
        ProcessingOrder::from_bytes(order_id.as_str(), &bytes)
    }

    pub fn put(&self, ledger: &mut dyn Ledger, order: &ProcessingOrder) -> Result<()> {
        ledger.put_private_data(&self.collection, order.order_id.as_str(), order.to_bytes()?)?;
        Ok(())
    }

    pub fn delete(&self, ledger: &mut dyn Ledger, order_id: &OrderId) -> Result<()> {
        ledger.del_private_data(&self.collection, order_id.as_str())?;
        Ok(())
    }

    pub fn query_by_selector(
        &self,
        ledger: &dyn Ledger,
        query: &RichQuery,
    ) -> Result<Vec<ProcessingOrder>> {
        decode_orders(ledger.get_private_data_query_result(&self.collection, query)?)
    }

    pub fn scan_range(
        &self,
        ledger: &dyn Ledger,
        start: &str,
        end: &str,
    ) -> Result<Vec<ProcessingOrder>> {
        decode_orders(ledger.get_private_data_by_range(&self.collection, start, end)?)
    }

    pub fn scan_all(&self, ledger: &dyn Ledger) -> Result<Vec<ProcessingOrder>> {
        let query = RichQuery::new().eq("assetType", AssetType::ProcessingOrder.as_str());
        self.query_by_selector(ledger, &query)
    }

    /// Build an order from the invocation's transient fields.
    ///
    /// Missing text fields are taken as empty. The quantity is parsed under
    /// the configured [`QuantityPolicy`].
    ///
    /// # Errors
    /// - `MissingTransientData` if none of the fields is present
    /// - `InvalidArgument` if a field is not UTF-8
    /// - `InvalidQuantity` if the strict policy rejects the quantity
    pub fn from_transient(
        &self,
        order_id: &OrderId,
        transient: &TransientMap,
    ) -> Result<ProcessingOrder> {
        if !has_order_fields(transient) {
            return Err(RiceError::MissingTransientData);
        }
        let variety = text_field(transient, constants::TRANSIENT_VARIETY)?;
        let miller_name = text_field(transient, constants::TRANSIENT_MILLER_NAME)?;
        let raw_quantity = transient
            .get(constants::TRANSIENT_QUANTITY)
            .map(|bytes| utf8(constants::TRANSIENT_QUANTITY, bytes))
            .transpose()?;
        let quantity = self
            .quantity_policy
            .parse(constants::TRANSIENT_QUANTITY, raw_quantity)?;
        Ok(ProcessingOrder::new(
            order_id.clone(),
            variety,
            miller_name,
            quantity,
        ))
    }
}

/// Whether any of the order fields was supplied.
pub(crate) fn has_order_fields(transient: &TransientMap) -> bool {
    [
        constants::TRANSIENT_VARIETY,
        constants::TRANSIENT_MILLER_NAME,
        constants::TRANSIENT_QUANTITY,
    ]
    .iter()
    .any(|field| transient.contains_key(*field))
}

fn text_field(transient: &TransientMap, field: &str) -> Result<String> {
    transient
        .get(field)
        .map_or(Ok(String::new()), |bytes| utf8(field, bytes).map(str::to_string))
}

fn utf8<'b>(field: &str, bytes: &'b [u8]) -> Result<&'b str> {
    std::str::from_utf8(bytes).map_err(|_| RiceError::InvalidArgument {
        reason: format!("transient field {field} is not valid UTF-8"),
    })
}

fn decode_orders(mut cursor: Cursor<KeyValue>) -> Result<Vec<ProcessingOrder>> {
    let mut orders = Vec::with_capacity(cursor.remaining());
    for kv in cursor.by_ref() {
        let kv = kv?;
        orders.push(ProcessingOrder::from_bytes(&kv.key, &kv.value)?);
    }
    cursor.close();
    Ok(orders)
}
