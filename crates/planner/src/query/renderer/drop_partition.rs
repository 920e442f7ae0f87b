use crate::query::{
    ast::drop_partition::DropPartition,
    dialect::PartitionStyle,
    renderer::{Render, Renderer},
};

impl Render for DropPartition {
    fn render(&self, r: &mut Renderer) {
        match r.dialect.partition_style() {
            PartitionStyle::AlterTableDrop => {
                r.sql.push_str("ALTER TABLE ");
                r.render_table_ref(&self.table);
                r.sql.push_str(" DROP PARTITION ");
                r.sql.push_str(&r.dialect.render_identifier(&self.partition));
            }
            PartitionStyle::ChildTable => {
                // No IF EXISTS: a missing partition has to surface as an error
                // so the caller can tell it apart from other failures.
                r.sql.push_str("DROP TABLE ");
                let child = self.table.with_suffix(&self.partition);
                r.render_table_ref(&child);
            }
        }
    }
}
