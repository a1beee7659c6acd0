use crate::link::{AbsoluteLink, Scheme};

/// Resolves a reference found on a page into an [`AbsoluteLink`]
///
/// # Resolution Rules
///
/// 1. A reference starting with `http://` or `https://` is already absolute
///    and gets an empty base.
/// 2. Otherwise the parent's absolute URL is split into its scheme prefix and
///    the scheme-stripped remainder, and the base is cut from the remainder:
///
/// | Reference starts with | Base kept from the parent |
/// |-----------------------|---------------------------|
/// | `?` | whole URL, one trailing `/` removed |
/// | `/` | up to (excluding) the first `/` after the authority |
/// | anything else | up to and including the last `/`, or the whole URL plus `/` |
///
/// The rules are string surgery, not RFC 3986 resolution: dot segments are kept,
/// an existing query on the parent is not replaced, and a protocol-relative
/// `//host/path` is treated as root-relative.
///
/// # Arguments
///
/// * `parent` - The link of the page the reference was found on, if any
/// * `found` - The reference string as it appeared in the markup
///
/// # Returns
///
/// The resolved link. Without a parent the reference is taken as-is.
///
/// # Examples
///
/// ```
/// use spoder::link::{resolve, AbsoluteLink};
///
/// let page = AbsoluteLink::absolute("https://a.com/x/y");
/// assert_eq!(resolve(Some(&page), "/z").to_string(), "https://a.com/z");
/// assert_eq!(resolve(Some(&page), "z").to_string(), "https://a.com/x/z");
/// ```
pub fn resolve(parent: Option<&AbsoluteLink>, found: &str) -> AbsoluteLink {
    if Scheme::of(found).is_some() {
        return AbsoluteLink::absolute(found);
    }

    let Some(parent) = parent else {
        return AbsoluteLink::absolute(found);
    };

    let parent_url = parent.to_string();
    let (prefix, rest) = split_scheme(&parent_url);

    let mut base = String::with_capacity(parent_url.len() + 1);
    base.push_str(prefix);

    if found.starts_with('?') {
        base.push_str(rest.strip_suffix('/').unwrap_or(rest));
    } else if found.starts_with('/') {
        match rest.find('/') {
            Some(index) => base.push_str(&rest[..index]),
            None => base.push_str(rest),
        }
    } else {
        match rest.rfind('/') {
            Some(index) => base.push_str(&rest[..=index]),
            None => {
                base.push_str(rest);
                base.push('/');
            }
        }
    }

    AbsoluteLink::new(base, found)
}

/// Splits an URL into its literal scheme prefix and the remainder
fn split_scheme(url: &str) -> (&str, &str) {
    match Scheme::of(url) {
        Some(scheme) => url.split_at(scheme.prefix().len()),
        None => ("", url),
    }
}
