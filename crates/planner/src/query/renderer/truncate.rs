use crate::query::{
    ast::truncate::Truncate,
    renderer::{Render, Renderer},
};

impl Render for Truncate {
    fn render(&self, r: &mut Renderer) {
        r.sql.push_str("TRUNCATE TABLE ");
        r.render_table_ref(&self.table);
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        query::{
            ast::truncate::Truncate,
            dialect::{MySql, Postgres},
            renderer::render_sql,
        },
        table_ref,
    };

    #[test]
    fn test_render_truncate() {
        let ast = Truncate {
            table: table_ref!("public", "events"),
        };

        assert_eq!(
            render_sql(&ast, &Postgres),
            "TRUNCATE TABLE public.events"
        );
        assert_eq!(render_sql(&ast, &MySql), "TRUNCATE TABLE public.events");
    }
}
