//! Command grammar.
//!
//! Commands are positional: keywords sit at fixed offsets and each is
//! followed by its value, e.g.
//!
//! ```text
//! define inventory inv_1 location s1:a1:sh1 capacity 10 count 5 type standard product p1
//! add_basket_item b1 product p1 item_count 2
//! ```

use core::str::FromStr;

use thiserror::Error;

use smartstore_core::{
    BasketId, CustomerId, DeviceId, InventoryId, InventoryLocation, ParseError, ProductId,
    StoreError, StoreId, StoreLocation,
};
use smartstore_customers::CreateCustomer;
use smartstore_engine::{ProvisionAisle, ProvisionDevice, ProvisionShelf, StoreService, UpdateStore};
use smartstore_inventory::CreateInventory;
use smartstore_products::{CreateProduct, parse_price_cents};
use smartstore_stores::CreateStore;

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Unrecognized Command")]
    Unrecognized,

    #[error("missing argument '{0}'")]
    MissingArgument(&'static str),

    #[error("expected '{expected}' but found '{found}'")]
    UnexpectedToken {
        expected: &'static str,
        found: String,
    },

    #[error("unterminated quote")]
    UnterminatedQuote,

    #[error("invalid argument: {0}")]
    InvalidArgument(#[from] ParseError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("output serialization failed: {0}")]
    Output(#[from] serde_json::Error),
}

/// What a successful command produced.
#[derive(Debug, Clone, PartialEq)]
pub enum Output {
    /// JSON projection of the affected entity.
    View(serde_json::Value),
    /// Text reply from a device.
    Message(String),
}

impl core::fmt::Display for Output {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Output::View(value) => write!(f, "{value}"),
            Output::Message(message) => f.write_str(message),
        }
    }
}

/// One parsed script line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    DefineStore(CreateStore),
    ShowStore(StoreId),
    UpdateStore(UpdateStore),
    DeleteStore(StoreId),
    ShowStoreCustomers(StoreId),
    DefineAisle(ProvisionAisle),
    ShowAisle(StoreLocation),
    DefineShelf(ProvisionShelf),
    ShowShelf(InventoryLocation),
    DefineProduct(CreateProduct),
    ShowProduct(ProductId),
    DefineInventory(CreateInventory),
    ShowInventory(InventoryId),
    UpdateInventory {
        inventory_id: InventoryId,
        delta: i64,
    },
    DefineCustomer(CreateCustomer),
    UpdateCustomer {
        customer_id: CustomerId,
        location: StoreLocation,
    },
    ShowCustomer(CustomerId),
    DefineBasket(BasketId),
    AssignBasket {
        basket_id: BasketId,
        customer_id: CustomerId,
    },
    GetCustomerBasket(CustomerId),
    AddBasketItem {
        basket_id: BasketId,
        product_id: ProductId,
        count: i64,
    },
    RemoveBasketItem {
        basket_id: BasketId,
        product_id: ProductId,
        count: i64,
    },
    ClearBasket(BasketId),
    ShowBasket(BasketId),
    DefineDevice(ProvisionDevice),
    ShowDevice(DeviceId),
    RaiseEvent {
        device_id: DeviceId,
        event: String,
    },
    IssueCommand {
        device_id: DeviceId,
        message: String,
    },
}

/// Positional view over a tokenized line.
struct Args<'a> {
    tokens: &'a [String],
}

impl<'a> Args<'a> {
    fn get(&self, index: usize, name: &'static str) -> Result<&'a str, CommandError> {
        self.tokens
            .get(index)
            .map(String::as_str)
            .ok_or(CommandError::MissingArgument(name))
    }

    fn parse<T>(&self, index: usize, name: &'static str) -> Result<T, CommandError>
    where
        T: FromStr<Err = ParseError>,
    {
        Ok(self.get(index, name)?.parse()?)
    }

    /// Check that `keyword` sits at `index` and return the value after it.
    fn keyed(&self, index: usize, keyword: &'static str) -> Result<&'a str, CommandError> {
        let found = self.get(index, keyword)?;
        if !found.eq_ignore_ascii_case(keyword) {
            return Err(CommandError::UnexpectedToken {
                expected: keyword,
                found: found.to_string(),
            });
        }
        self.get(index + 1, keyword)
    }

    fn parse_keyed<T>(&self, index: usize, keyword: &'static str) -> Result<T, CommandError>
    where
        T: FromStr<Err = ParseError>,
    {
        Ok(self.keyed(index, keyword)?.parse()?)
    }

    fn count_keyed(&self, index: usize, keyword: &'static str) -> Result<i64, CommandError> {
        let raw = self.keyed(index, keyword)?;
        raw.trim().parse().map_err(|_| {
            CommandError::InvalidArgument(ParseError::InvalidNumber {
                kind: keyword,
                value: raw.to_string(),
            })
        })
    }

    /// Words from `index` to the end, joined by single spaces.
    fn rest(&self, index: usize, name: &'static str) -> Result<String, CommandError> {
        let words = self.tokens.get(index..).unwrap_or_default();
        if words.is_empty() {
            return Err(CommandError::MissingArgument(name));
        }
        Ok(words.join(" "))
    }
}

impl Command {
    pub fn parse(line: &str) -> Result<Self, CommandError> {
        let tokens = crate::tokenizer::tokenize(line)?;
        let args = Args { tokens: &tokens };

        let verb = args.get(0, "command")?.to_ascii_lowercase();
        match verb.as_str() {
            "get_customer_basket" => return Ok(Command::GetCustomerBasket(args.parse(1, "customer")?)),
            "add_basket_item" => {
                return Ok(Command::AddBasketItem {
                    basket_id: args.parse(1, "basket")?,
                    product_id: args.parse_keyed(2, "product")?,
                    count: args.count_keyed(4, "item_count")?,
                });
            }
            "remove_basket_item" => {
                return Ok(Command::RemoveBasketItem {
                    basket_id: args.parse(1, "basket")?,
                    product_id: args.parse_keyed(2, "product")?,
                    count: args.count_keyed(4, "item_count")?,
                });
            }
            "clear_basket" => return Ok(Command::ClearBasket(args.parse(1, "basket")?)),
            _ => {}
        }

        let noun = args.get(1, "object")?.to_ascii_lowercase();
        let command = match (verb.as_str(), noun.as_str()) {
            ("define", "store") => Command::DefineStore(CreateStore {
                store_id: args.parse(2, "store")?,
                description: args.keyed(3, "name")?.to_string(),
                address: args.keyed(5, "address")?.to_string(),
            }),
            ("show", "store") => Command::ShowStore(args.parse(2, "store")?),
            ("update", "store") => Command::UpdateStore(Self::update_store(&args)?),
            ("delete", "store") => Command::DeleteStore(args.parse(2, "store")?),
            ("show", "store_customers") => Command::ShowStoreCustomers(args.parse(2, "store")?),

            ("define", "aisle") => Command::DefineAisle(ProvisionAisle {
                location: args.parse(2, "location")?,
                name: args.keyed(3, "name")?.to_string(),
                description: args.keyed(5, "description")?.to_string(),
                aisle_location: args.parse_keyed(7, "location")?,
            }),
            ("show", "aisle") => Command::ShowAisle(args.parse(2, "location")?),

            ("define", "shelf") => Command::DefineShelf(ProvisionShelf {
                location: args.parse(2, "location")?,
                name: args.keyed(3, "name")?.to_string(),
                level: args.parse_keyed(5, "level")?,
                description: args.keyed(7, "description")?.to_string(),
                temperature: args.parse_keyed(9, "temperature")?,
            }),
            ("show", "shelf") => Command::ShowShelf(args.parse(2, "location")?),

            ("define", "product") => Command::DefineProduct(CreateProduct {
                product_id: args.parse(2, "product")?,
                name: args.keyed(3, "name")?.to_string(),
                description: args.keyed(5, "description")?.to_string(),
                size: args.keyed(7, "size")?.to_string(),
                category: args.keyed(9, "category")?.to_string(),
                unit_price_cents: parse_price_cents(args.keyed(11, "unit_price")?)?,
                temperature: args.parse_keyed(13, "temperature")?,
            }),
            ("show", "product") => Command::ShowProduct(args.parse(2, "product")?),

            ("define", "inventory") => Command::DefineInventory(CreateInventory {
                inventory_id: args.parse(2, "inventory")?,
                location: args.parse_keyed(3, "location")?,
                capacity: args.count_keyed(5, "capacity")?,
                count: args.count_keyed(7, "count")?,
                kind: args.parse_keyed(9, "type")?,
                product_id: args.parse_keyed(11, "product")?,
            }),
            ("show", "inventory") => Command::ShowInventory(args.parse(2, "inventory")?),
            ("update", "inventory") => Command::UpdateInventory {
                inventory_id: args.parse(2, "inventory")?,
                delta: args.count_keyed(3, "update_count")?,
            },

            ("define", "customer") => Command::DefineCustomer(CreateCustomer {
                customer_id: args.parse(2, "customer")?,
                first_name: args.keyed(3, "first_name")?.to_string(),
                last_name: args.keyed(5, "last_name")?.to_string(),
                kind: args.parse_keyed(7, "type")?,
                email: args.keyed(9, "email_address")?.to_string(),
                account_address: args.keyed(11, "account")?.to_string(),
            }),
            ("update", "customer") => Command::UpdateCustomer {
                customer_id: args.parse(2, "customer")?,
                location: args.parse_keyed(3, "location")?,
            },
            ("show", "customer") => Command::ShowCustomer(args.parse(2, "customer")?),

            ("define", "basket") => Command::DefineBasket(args.parse(2, "basket")?),
            ("assign", "basket") => Command::AssignBasket {
                basket_id: args.parse(2, "basket")?,
                customer_id: args.parse_keyed(3, "customer")?,
            },
            ("show", "basket_items") => Command::ShowBasket(args.parse(2, "basket")?),

            ("define", "device") => Command::DefineDevice(ProvisionDevice {
                device_id: args.parse(2, "device")?,
                name: args.keyed(3, "name")?.to_string(),
                device_type: args.keyed(5, "type")?.to_string(),
                location: args.parse_keyed(7, "location")?,
            }),
            ("show", "device") => Command::ShowDevice(args.parse(2, "device")?),

            ("create", "event") => {
                args.keyed(3, "event")?;
                Command::RaiseEvent {
                    device_id: args.parse(2, "device")?,
                    event: args.rest(4, "event")?,
                }
            }
            ("create", "command") => {
                args.keyed(3, "message")?;
                Command::IssueCommand {
                    device_id: args.parse(2, "device")?,
                    message: args.rest(4, "message")?,
                }
            }

            _ => return Err(CommandError::Unrecognized),
        };
        Ok(command)
    }

    /// `update store <id> [description <d>] [address <a>]`
    fn update_store(args: &Args<'_>) -> Result<UpdateStore, CommandError> {
        let mut update = UpdateStore {
            store_id: args.parse(2, "store")?,
            description: None,
            address: None,
        };
        let mut index = 3;
        while index < args.tokens.len() {
            let keyword = args.get(index, "field")?;
            let value = args.get(index + 1, "value")?.to_string();
            match keyword.to_ascii_lowercase().as_str() {
                "description" => update.description = Some(value),
                "address" => update.address = Some(value),
                _ => {
                    return Err(CommandError::UnexpectedToken {
                        expected: "description|address",
                        found: keyword.to_string(),
                    });
                }
            }
            index += 2;
        }
        Ok(update)
    }

    /// Run against the engine.
    pub fn execute(self, service: &StoreService) -> Result<Output, CommandError> {
        fn view<T: serde::Serialize>(value: T) -> Result<Output, CommandError> {
            Ok(Output::View(serde_json::to_value(value)?))
        }

        match self {
            Command::DefineStore(cmd) => view(service.provision_store(cmd)?),
            Command::ShowStore(id) => view(service.show_store(&id)?),
            Command::UpdateStore(cmd) => view(service.update_store(cmd)?),
            Command::DeleteStore(id) => view(service.delete_store(&id)?),
            Command::ShowStoreCustomers(id) => view(service.store_customers(&id)?),
            Command::DefineAisle(cmd) => view(service.provision_aisle(cmd)?),
            Command::ShowAisle(location) => view(service.show_aisle(&location)?),
            Command::DefineShelf(cmd) => view(service.provision_shelf(cmd)?),
            Command::ShowShelf(location) => view(service.show_shelf(&location)?),
            Command::DefineProduct(cmd) => view(service.provision_product(cmd)?),
            Command::ShowProduct(id) => view(service.show_product(&id)?),
            Command::DefineInventory(cmd) => view(service.provision_inventory(cmd)?),
            Command::ShowInventory(id) => view(service.show_inventory(&id)?),
            Command::UpdateInventory {
                inventory_id,
                delta,
            } => view(service.update_inventory(&inventory_id, delta)?),
            Command::DefineCustomer(cmd) => view(service.provision_customer(cmd)?),
            Command::UpdateCustomer {
                customer_id,
                location,
            } => view(service.update_customer(&customer_id, location)?),
            Command::ShowCustomer(id) => view(service.show_customer(&id)?),
            Command::DefineBasket(id) => view(service.provision_basket(id)?),
            Command::AssignBasket {
                basket_id,
                customer_id,
            } => view(service.assign_customer_basket(&customer_id, &basket_id)?),
            Command::GetCustomerBasket(id) => view(service.get_customer_basket(&id)?),
            Command::AddBasketItem {
                basket_id,
                product_id,
                count,
            } => view(service.add_basket_product(&basket_id, &product_id, count)?),
            Command::RemoveBasketItem {
                basket_id,
                product_id,
                count,
            } => view(service.remove_basket_product(&basket_id, &product_id, count)?),
            Command::ClearBasket(id) => view(service.clear_basket(&id)?),
            Command::ShowBasket(id) => view(service.show_basket(&id)?),
            Command::DefineDevice(cmd) => view(service.provision_device(cmd)?),
            Command::ShowDevice(id) => view(service.show_device(&id)?),
            Command::RaiseEvent { device_id, event } => {
                Ok(Output::Message(service.raise_event(&device_id, &event)?))
            }
            Command::IssueCommand { device_id, message } => {
                Ok(Output::Message(service.issue_command(&device_id, &message)?))
            }
        }
    }
}
