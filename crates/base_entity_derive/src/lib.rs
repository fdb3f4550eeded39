use proc_macro::TokenStream;
use quote::quote;
use syn::{Fields, ItemStruct, LitStr, Path, Type, parse_macro_input, parse_quote};

struct EntityArgs {
    traits: Path,
    id_type: Type,
}

impl Default for EntityArgs {
    fn default() -> Self {
        Self {
            traits: parse_quote!(crate::db::dao::base_traits),
            id_type: parse_quote!(i32),
        }
    }
}

/// Injects a database-assigned primary key and the `created_at` / `updated_at`
/// columns into a sea-orm model, then wires the model into the DAO timestamp
/// traits.
///
/// ```ignore
/// #[base_entity]
/// #[sea_orm::model]
/// #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
/// #[sea_orm(table_name = "todos")]
/// pub struct Model {
///     pub title: String,
/// }
/// ```
///
/// Accepts `traits = "path::to::base_traits"` and `id_type = "i64"`.
#[proc_macro_attribute]
pub fn base_entity(attr: TokenStream, item: TokenStream) -> TokenStream {
    let mut args = EntityArgs::default();
    let parser = syn::meta::parser(|meta| {
        if meta.path.is_ident("traits") {
            args.traits = meta.value()?.parse::<LitStr>()?.parse()?;
            Ok(())
        } else if meta.path.is_ident("id_type") {
            args.id_type = meta.value()?.parse::<LitStr>()?.parse()?;
            Ok(())
        } else {
            Err(meta.error("unsupported base_entity argument"))
        }
    });
    parse_macro_input!(attr with parser);

    let mut input = parse_macro_input!(item as ItemStruct);
    let Fields::Named(fields) = &mut input.fields else {
        return syn::Error::new_spanned(&input, "base_entity requires named fields")
            .to_compile_error()
            .into();
    };

    let declared = |name: &str| {
        fields
            .named
            .iter()
            .any(|field| field.ident.as_ref().is_some_and(|ident| *ident == name))
    };
    for name in ["id", "created_at", "updated_at"] {
        if declared(name) {
            return syn::Error::new_spanned(
                &fields.named,
                format!("`{name}` is managed by base_entity and must not be declared"),
            )
            .to_compile_error()
            .into();
        }
    }

    let id_type = &args.id_type;
    fields.named.insert(
        0,
        parse_quote! {
            #[sea_orm(primary_key)]
            pub id: #id_type
        },
    );
    fields.named.push(parse_quote! {
        #[sea_orm(default_expr = "Expr::current_timestamp()")]
        pub created_at: sea_orm::entity::prelude::DateTimeWithTimeZone
    });
    fields.named.push(parse_quote! {
        #[sea_orm(default_expr = "Expr::current_timestamp()")]
        pub updated_at: sea_orm::entity::prelude::DateTimeWithTimeZone
    });

    let traits = &args.traits;
    quote! {
        #input

        impl #traits::TimestampedActiveModel for ActiveModel {
            fn set_created_at(&mut self, ts: sea_orm::entity::prelude::DateTimeWithTimeZone) {
                self.created_at = sea_orm::ActiveValue::Set(ts);
            }

            fn set_updated_at(&mut self, ts: sea_orm::entity::prelude::DateTimeWithTimeZone) {
                self.updated_at = sea_orm::ActiveValue::Set(ts);
            }
        }

        impl #traits::HasCreatedAtColumn for Entity {
            fn created_at_column() -> Column {
                Column::CreatedAt
            }
        }
    }
    .into()
}
