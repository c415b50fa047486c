use crate::models::FieldErrors;
use crate::Product;
use std::collections::HashMap;
use std::fmt::Write;

pub(crate) fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

pub(crate) fn layout(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{title}</title>\n</head>\n<body>\n<h1>{title}</h1>\n{body}</body>\n</html>\n",
        title = escape(title),
        body = body,
    )
}

pub(crate) fn yes_no(value: bool) -> &'static str {
    if value {
        "Yes"
    } else {
        "No"
    }
}

/// The creation form as last submitted: raw values plus any field errors.
#[derive(Debug, Default)]
pub(crate) struct ProductForm {
    pub values: HashMap<String, String>,
    pub errors: FieldErrors,
}

impl ProductForm {
    pub fn empty() -> Self {
        let mut values = HashMap::new();
        values.insert("stock_quantity".to_string(), "0".to_string());
        values.insert("is_active".to_string(), "on".to_string());
        Self {
            values,
            errors: FieldErrors::new(),
        }
    }

    fn value(&self, field: &str) -> String {
        escape(self.values.get(field).map(String::as_str).unwrap_or_default())
    }

    fn errors_for(&self, out: &mut String, field: &str) {
        let messages = self.errors.get(field);
        if messages.is_empty() {
            return;
        }
        out.push_str("<ul class=\"errorlist\">");
        for message in messages {
            let _ = write!(out, "<li>{}</li>", escape(message));
        }
        out.push_str("</ul>\n");
    }

    pub fn render(&self) -> String {
        let mut out = String::from("<form method=\"post\" action=\"/\">\n");
        self.errors_for(&mut out, "non_field_errors");

        self.errors_for(&mut out, "name");
        let _ = writeln!(
            out,
            "<p><label for=\"id_name\">Name:</label> \
             <input type=\"text\" name=\"name\" id=\"id_name\" maxlength=\"255\" value=\"{}\" required></p>",
            self.value("name")
        );

        self.errors_for(&mut out, "description");
        let _ = writeln!(
            out,
            "<p><label for=\"id_description\">Description:</label> \
             <textarea name=\"description\" id=\"id_description\">{}</textarea></p>",
            self.value("description")
        );

        self.errors_for(&mut out, "price");
        let _ = writeln!(
            out,
            "<p><label for=\"id_price\">Price:</label> \
             <input type=\"number\" name=\"price\" id=\"id_price\" step=\"0.01\" value=\"{}\" required></p>",
            self.value("price")
        );

        self.errors_for(&mut out, "stock_quantity");
        let _ = writeln!(
            out,
            "<p><label for=\"id_stock_quantity\">Stock quantity:</label> \
             <input type=\"number\" name=\"stock_quantity\" id=\"id_stock_quantity\" value=\"{}\"></p>",
            self.value("stock_quantity")
        );

        self.errors_for(&mut out, "is_active");
        let checked = if self.values.contains_key("is_active") {
            " checked"
        } else {
            ""
        };
        let _ = writeln!(
            out,
            "<p><label for=\"id_is_active\">Is active:</label> \
             <input type=\"checkbox\" name=\"is_active\" id=\"id_is_active\"{}></p>",
            checked
        );

        out.push_str("<button type=\"submit\">Add product</button>\n</form>\n");
        out
    }
}

pub(crate) fn product_list(products: &[Product]) -> String {
    if products.is_empty() {
        return "<p>No products yet.</p>\n".to_string();
    }
    let mut out = String::from("<ul class=\"products\">\n");
    for product in products {
        let _ = write!(
            out,
            "<li><strong>{}</strong> &mdash; {} ({} in stock{})",
            escape(&product.name),
            product.price,
            product.stock_quantity,
            if product.is_active { "" } else { ", inactive" },
        );
        if let Some(description) = &product.description {
            let _ = write!(out, "<br>{}", escape(description));
        }
        let _ = writeln!(
            out,
            "<form method=\"post\" action=\"/delete/{}/\" class=\"inline\">\
             <button type=\"submit\">Delete</button></form></li>",
            product.id
        );
    }
    out.push_str("</ul>\n");
    out
}
