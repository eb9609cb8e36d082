use indexmap::IndexMap;

use crate::marshal::{MarshalError, Result, TypeDescriptor};

/// Parsed field type expression such as `map<string, list<Inner>>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeExpr {
	/// Built-in scalar or temporal name, or a document-defined type.
	Named(String),
	/// `list<T>`.
	List(Box<TypeExpr>),
	/// `set<T>`.
	Set(Box<TypeExpr>),
	/// `map<K, V>`.
	Map(Box<TypeExpr>, Box<TypeExpr>),
	/// `tuple<A, B, ...>`.
	Tuple(Vec<TypeExpr>),
}

/// Descriptor for a built-in scalar or temporal type name.
pub fn builtin(name: &str) -> Option<TypeDescriptor> {
	let ty = match name {
		"bool" => TypeDescriptor::bool(),
		"int" => TypeDescriptor::int(),
		"uint" => TypeDescriptor::uint(),
		"float" => TypeDescriptor::float(),
		"string" => TypeDescriptor::string(),
		"datetime" => TypeDescriptor::datetime(),
		"date" => TypeDescriptor::date(),
		"time" => TypeDescriptor::time(),
		_ => return None,
	};
	Some(ty)
}

/// Whether `name` is reserved by the expression syntax.
pub fn is_reserved(name: &str) -> bool {
	builtin(name).is_some() || matches!(name, "list" | "set" | "map" | "tuple")
}

impl TypeExpr {
	/// Parse a type expression. Whitespace between tokens is ignored.
	pub fn parse(input: &str) -> Result<Self> {
		let mut parser = Parser { input, idx: 0 };
		let expr = parser.expr()?;
		parser.skip_ws();
		if parser.idx != input.len() {
			return Err(parser.error());
		}
		Ok(expr)
	}

	/// Names of document-defined types this expression references.
	pub fn references(&self) -> Vec<&str> {
		let mut out = Vec::new();
		self.collect_references(&mut out);
		out
	}

	fn collect_references<'a>(&'a self, out: &mut Vec<&'a str>) {
		match self {
			Self::Named(name) => {
				if builtin(name).is_none() {
					out.push(name);
				}
			}
			Self::List(item) | Self::Set(item) => item.collect_references(out),
			Self::Map(key, value) => {
				key.collect_references(out);
				value.collect_references(out);
			}
			Self::Tuple(items) => {
				for item in items {
					item.collect_references(out);
				}
			}
		}
	}

	/// Build the descriptor, looking up document-defined names in `named`.
	pub fn to_descriptor(&self, named: &IndexMap<String, TypeDescriptor>) -> Result<TypeDescriptor> {
		let ty = match self {
			Self::Named(name) => match builtin(name) {
				Some(ty) => ty,
				None => named.get(name).cloned().ok_or_else(|| MarshalError::SchemaDocument {
					reason: format!("unknown type {name}"),
				})?,
			},
			Self::List(item) => TypeDescriptor::sequence(item.to_descriptor(named)?),
			Self::Set(item) => TypeDescriptor::set(item.to_descriptor(named)?),
			Self::Map(key, value) => TypeDescriptor::map(key.to_descriptor(named)?, value.to_descriptor(named)?),
			Self::Tuple(items) => TypeDescriptor::tuple(items.iter().map(|item| item.to_descriptor(named)).collect::<Result<Vec<_>>>()?),
		};
		Ok(ty)
	}
}

struct Parser<'a> {
	input: &'a str,
	idx: usize,
}

impl Parser<'_> {
	fn error(&self) -> MarshalError {
		MarshalError::InvalidTypeExpr {
			expr: self.input.to_owned(),
		}
	}

	fn skip_ws(&mut self) {
		let bytes = self.input.as_bytes();
		while self.idx < bytes.len() && bytes[self.idx].is_ascii_whitespace() {
			self.idx += 1;
		}
	}

	fn eat(&mut self, byte: u8) -> bool {
		self.skip_ws();
		if self.input.as_bytes().get(self.idx) == Some(&byte) {
			self.idx += 1;
			true
		} else {
			false
		}
	}

	fn ident(&mut self) -> Result<&str> {
		self.skip_ws();
		let bytes = self.input.as_bytes();
		let start = self.idx;
		while self.idx < bytes.len() {
			let byte = bytes[self.idx];
			if byte.is_ascii_alphanumeric() || matches!(byte, b'_' | b':' | b'.') {
				self.idx += 1;
			} else {
				break;
			}
		}
		if self.idx == start {
			return Err(self.error());
		}
		Ok(&self.input[start..self.idx])
	}

	fn expr(&mut self) -> Result<TypeExpr> {
		let name = self.ident()?.to_owned();
		if !self.eat(b'<') {
			if matches!(name.as_str(), "list" | "set" | "map" | "tuple") {
				return Err(self.error());
			}
			return Ok(TypeExpr::Named(name));
		}

		let mut params = vec![self.expr()?];
		while self.eat(b',') {
			params.push(self.expr()?);
		}
		if !self.eat(b'>') {
			return Err(self.error());
		}

		let mut params = params.into_iter();
		let expr = match (name.as_str(), params.len()) {
			("list", 1) => TypeExpr::List(Box::new(self.next_param(&mut params)?)),
			("set", 1) => TypeExpr::Set(Box::new(self.next_param(&mut params)?)),
			("map", 2) => {
				let key = self.next_param(&mut params)?;
				let value = self.next_param(&mut params)?;
				TypeExpr::Map(Box::new(key), Box::new(value))
			}
			("tuple", _) => TypeExpr::Tuple(params.collect()),
			_ => return Err(self.error()),
		};
		Ok(expr)
	}

	fn next_param(&self, params: &mut impl Iterator<Item = TypeExpr>) -> Result<TypeExpr> {
		params.next().ok_or_else(|| self.error())
	}
}
