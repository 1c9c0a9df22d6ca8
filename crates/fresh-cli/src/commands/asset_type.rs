use super::{json_pretty, with_spinner, EXIT_SUCCESS};
use fresh_client::{AssetBackend, AssetType, FreshClient};

fn print_asset_type(asset_type: &AssetType) {
    println!("id:        {}", asset_type.id);
    println!("name:      {}", asset_type.name);
    if asset_type.parent_asset_type_id != 0 {
        println!("parent:    {}", asset_type.parent_asset_type_id);
    }
    println!("visible:   {}", asset_type.visible);
    if !asset_type.description.is_empty() {
        println!("about:     {}", asset_type.description);
    }
}

pub fn get(backend: &dyn AssetBackend, name: &str, json: bool) -> Result<u8, String> {
    let asset_type = with_spinner(json, "looking up asset type", "asset type found", || {
        backend.lookup_asset_type(name)
    })?;
    if json {
        println!("{}", json_pretty(&asset_type)?);
    } else {
        print_asset_type(&asset_type);
    }
    Ok(EXIT_SUCCESS)
}

pub fn list(client: &FreshClient, json: bool) -> Result<u8, String> {
    let asset_types = with_spinner(json, "listing asset types", "asset types listed", || {
        client.list_asset_types()
    })?;
    if json {
        println!("{}", json_pretty(&asset_types)?);
    } else if asset_types.is_empty() {
        println!("no asset types");
    } else {
        println!("{:<14} {:<14} NAME", "ID", "PARENT");
        for t in &asset_types {
            let parent = if t.parent_asset_type_id == 0 {
                "-".to_owned()
            } else {
                t.parent_asset_type_id.to_string()
            };
            println!("{:<14} {parent:<14} {}", t.id, t.name);
        }
    }
    Ok(EXIT_SUCCESS)
}
