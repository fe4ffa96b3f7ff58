use syn::meta::ParseNestedMeta;
use syn::{Attribute, Expr, Lit, LitStr, Meta};

///
/// HclAttrs
/// `#[hcl(...)]` items on a field or variant
///

#[derive(Default)]
pub struct HclAttrs {
    pub rename: Option<String>,
    pub skip: bool,
    pub omit_empty: bool,
    pub unordered: bool,
    pub wrap_under: Option<String>,
    pub embed: bool,
    pub doc: Option<String>,
}

///
/// SerdeAttrs
/// the subset of `#[serde(...)]` read as the fallback annotation
///

#[derive(Default)]
pub struct SerdeAttrs {
    pub rename: Option<String>,
    pub skip: bool,
    pub omit_empty: bool,
    pub flatten: bool,
}

///
/// FieldAttrs
///

#[derive(Default)]
pub struct FieldAttrs {
    pub hcl: HclAttrs,
    pub serde: SerdeAttrs,
    pub rustdoc: Option<String>,
}

impl FieldAttrs {
    pub fn parse(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut out = Self::default();

        for attr in attrs {
            if attr.path().is_ident("hcl") {
                attr.parse_nested_meta(|meta| parse_hcl_item(&mut out.hcl, &meta))?;
            } else if attr.path().is_ident("serde") {
                attr.parse_nested_meta(|meta| parse_serde_item(&mut out.serde, &meta))?;
            }
        }
        out.rustdoc = rustdoc(attrs);

        Ok(out)
    }

    /// Lowered `#[hcl(...)]`: `<key>[,omit_empty][,unordered][,wrap_under=<w>]`
    pub fn primary_tag(&self) -> Option<String> {
        let hcl = &self.hcl;
        if hcl.skip {
            return Some("-".to_string());
        }
        if hcl.rename.is_none() && !hcl.omit_empty && !hcl.unordered && hcl.wrap_under.is_none() {
            return None;
        }

        let mut tag = hcl.rename.clone().unwrap_or_default();
        if hcl.omit_empty {
            tag.push_str(",omit_empty");
        }
        if hcl.unordered {
            tag.push_str(",unordered");
        }
        if let Some(wrap) = &hcl.wrap_under {
            tag.push_str(",wrap_under=");
            tag.push_str(wrap);
        }
        Some(tag)
    }

    /// Lowered serde attributes: `<key>[,omit_empty]`
    pub fn fallback_tag(&self) -> Option<String> {
        let serde = &self.serde;
        if serde.skip {
            return Some("-".to_string());
        }
        if serde.rename.is_none() && !serde.omit_empty {
            return None;
        }

        let mut tag = serde.rename.clone().unwrap_or_default();
        if serde.omit_empty {
            tag.push_str(",omit_empty");
        }
        Some(tag)
    }

    pub fn is_excluded(&self) -> bool {
        match self.primary_tag() {
            Some(tag) => tag == "-",
            None => self.serde.skip,
        }
    }

    pub fn is_embedded(&self) -> bool {
        self.hcl.embed || self.serde.flatten
    }

    pub fn documentation(&self) -> Option<String> {
        self.hcl.doc.clone().or_else(|| self.rustdoc.clone())
    }

    /// Explicit key of an enum variant
    pub fn variant_rename(&self) -> Option<String> {
        self.hcl.rename.clone().or_else(|| self.serde.rename.clone())
    }
}

fn parse_hcl_item(out: &mut HclAttrs, meta: &ParseNestedMeta) -> syn::Result<()> {
    if meta.path.is_ident("rename") {
        out.rename = Some(meta.value()?.parse::<LitStr>()?.value());
    } else if meta.path.is_ident("skip") {
        out.skip = true;
    } else if meta.path.is_ident("omit_empty") {
        out.omit_empty = true;
    } else if meta.path.is_ident("unordered") {
        out.unordered = true;
    } else if meta.path.is_ident("wrap_under") {
        out.wrap_under = Some(meta.value()?.parse::<LitStr>()?.value());
    } else if meta.path.is_ident("embed") {
        out.embed = true;
    } else if meta.path.is_ident("doc") {
        out.doc = Some(meta.value()?.parse::<LitStr>()?.value());
    } else {
        return Err(meta.error("unsupported hcl attribute"));
    }

    Ok(())
}

fn parse_serde_item(out: &mut SerdeAttrs, meta: &ParseNestedMeta) -> syn::Result<()> {
    if meta.path.is_ident("rename") && meta.input.peek(syn::Token![=]) {
        out.rename = Some(meta.value()?.parse::<LitStr>()?.value());
    } else if meta.path.is_ident("skip") || meta.path.is_ident("skip_serializing") {
        out.skip = true;
    } else if meta.path.is_ident("skip_serializing_if") {
        out.omit_empty = true;
        skip_item(meta)?;
    } else if meta.path.is_ident("flatten") {
        out.flatten = true;
    } else {
        skip_item(meta)?;
    }

    Ok(())
}

// consume `= value` or `(...)` of a serde item we do not interpret
fn skip_item(meta: &ParseNestedMeta) -> syn::Result<()> {
    if meta.input.peek(syn::Token![=]) {
        meta.value()?.parse::<Expr>()?;
    } else if meta.input.peek(syn::token::Paren) {
        meta.parse_nested_meta(|inner| skip_item(&inner))?;
    }

    Ok(())
}

fn rustdoc(attrs: &[Attribute]) -> Option<String> {
    let lines: Vec<String> = attrs
        .iter()
        .filter(|attr| attr.path().is_ident("doc"))
        .filter_map(|attr| match &attr.meta {
            Meta::NameValue(nv) => match &nv.value {
                Expr::Lit(expr) => match &expr.lit {
                    Lit::Str(s) => Some(s.value().trim().to_string()),
                    _ => None,
                },
                _ => None,
            },
            _ => None,
        })
        .filter(|line| !line.is_empty())
        .collect();

    if lines.is_empty() {
        None
    } else {
        Some(lines.join(" "))
    }
}
